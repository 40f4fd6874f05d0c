//! Assimp C 结构体的内存布局
//!
//! 字段命名与 `assimp/scene.h`、`assimp/mesh.h`、`assimp/material.h` 保持一致，便于和头文件逐项对照。
//! `aiScene` 与 `aiMesh` 只会通过指针读取，因此只描述了本 crate 用到的、各版本间稳定的前缀部分。
//!
//! 布局假设 Assimp 以单精度 (`ai_real = float`) 编译。

#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals)]

use std::ffi::{c_char, c_uint, c_void};

/// `aiString` 内联缓冲区大小
pub const MAXLEN: usize = 1024;

pub const AI_MAX_NUMBER_OF_COLOR_SETS: usize = 8;
pub const AI_MAX_NUMBER_OF_TEXTURECOORDS: usize = 8;

/// 场景导入不完整（缺少网格等）时 `aiScene::mFlags` 中的标志位
pub const AI_SCENE_FLAGS_INCOMPLETE: c_uint = 0x1;
pub const AI_SCENE_FLAGS_VALIDATED: c_uint = 0x2;
pub const AI_SCENE_FLAGS_VALIDATION_WARNING: c_uint = 0x4;
pub const AI_SCENE_FLAGS_NON_VERBOSE_FORMAT: c_uint = 0x8;
pub const AI_SCENE_FLAGS_TERRAIN: c_uint = 0x10;

// aiPropertyTypeInfo
pub const aiPTI_Float: i32 = 0x1;
pub const aiPTI_Double: i32 = 0x2;
pub const aiPTI_String: i32 = 0x3;
pub const aiPTI_Integer: i32 = 0x4;
pub const aiPTI_Buffer: i32 = 0x5;


#[repr(C)]
#[derive(Clone, Copy)]
pub struct aiString {
    pub length: u32,
    pub data: [c_char; MAXLEN],
}

impl Default for aiString {
    fn default() -> Self {
        Self {
            length: 0,
            data: [0; MAXLEN],
        }
    }
}

impl aiString {
    /// 超过 `MAXLEN - 1` 的部分会被截断，与 Assimp 的行为一致
    pub fn new(s: &str) -> Self {
        let mut out = Self::default();
        let len = s.len().min(MAXLEN - 1);
        for (dst, src) in out.data.iter_mut().zip(&s.as_bytes()[..len]) {
            *dst = *src as c_char;
        }
        out.length = len as u32;
        out
    }

    pub fn as_bytes(&self) -> &[u8] {
        let len = (self.length as usize).min(MAXLEN - 1);
        bytemuck::cast_slice(&self.data[..len])
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl std::fmt::Debug for aiString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "aiString({:?})", self.to_string_lossy())
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct aiVector3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct aiColor4D {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// 行主序：`a1..a4` 为第一行
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct aiMatrix4x4 {
    pub a1: f32,
    pub a2: f32,
    pub a3: f32,
    pub a4: f32,
    pub b1: f32,
    pub b2: f32,
    pub b3: f32,
    pub b4: f32,
    pub c1: f32,
    pub c2: f32,
    pub c3: f32,
    pub c4: f32,
    pub d1: f32,
    pub d2: f32,
    pub d3: f32,
    pub d4: f32,
}

impl aiMatrix4x4 {
    pub const IDENTITY: Self = Self::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let [a, b, c, d] = rows;
        Self {
            a1: a[0],
            a2: a[1],
            a3: a[2],
            a4: a[3],
            b1: b[0],
            b2: b[1],
            b3: b[2],
            b4: b[3],
            c1: c[0],
            c2: c[1],
            c3: c[2],
            c4: c[3],
            d1: d[0],
            d2: d[1],
            d3: d[2],
            d4: d[3],
        }
    }

    pub fn to_rows(&self) -> [[f32; 4]; 4] {
        bytemuck::cast(*self)
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct aiAABB {
    pub mMin: aiVector3D,
    pub mMax: aiVector3D,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct aiFace {
    pub mNumIndices: c_uint,
    pub mIndices: *mut c_uint,
}

#[repr(C)]
pub struct aiNode {
    pub mName: aiString,
    pub mTransformation: aiMatrix4x4,
    pub mParent: *mut aiNode,
    pub mNumChildren: c_uint,
    pub mChildren: *mut *mut aiNode,
    pub mNumMeshes: c_uint,
    pub mMeshes: *mut c_uint,
    pub mMetaData: *mut c_void,
}

/// `aiMesh` 的前缀部分，止于 `mAABB`
#[repr(C)]
pub struct aiMesh {
    pub mPrimitiveTypes: c_uint,
    pub mNumVertices: c_uint,
    pub mNumFaces: c_uint,
    pub mVertices: *mut aiVector3D,
    pub mNormals: *mut aiVector3D,
    pub mTangents: *mut aiVector3D,
    pub mBitangents: *mut aiVector3D,
    pub mColors: [*mut aiColor4D; AI_MAX_NUMBER_OF_COLOR_SETS],
    pub mTextureCoords: [*mut aiVector3D; AI_MAX_NUMBER_OF_TEXTURECOORDS],
    pub mNumUVComponents: [c_uint; AI_MAX_NUMBER_OF_TEXTURECOORDS],
    pub mFaces: *mut aiFace,
    pub mNumBones: c_uint,
    pub mBones: *mut *mut c_void,
    pub mMaterialIndex: c_uint,
    pub mName: aiString,
    pub mNumAnimMeshes: c_uint,
    pub mAnimMeshes: *mut *mut c_void,
    pub mMethod: c_uint,
    pub mAABB: aiAABB,
}

#[repr(C)]
pub struct aiMaterialProperty {
    pub mKey: aiString,
    /// 纹理相关属性中为 `aiTextureType`，其余为 0
    pub mSemantic: c_uint,
    /// 纹理相关属性中为纹理序号，其余为 0
    pub mIndex: c_uint,
    pub mDataLength: c_uint,
    /// `aiPropertyTypeInfo`
    pub mType: i32,
    pub mData: *mut c_char,
}

impl aiMaterialProperty {
    /// 属性的原始数据
    ///
    /// # Safety
    /// `mData` 必须指向至少 `mDataLength` 字节的有效内存，并且在返回的切片存活期间保持有效。
    pub unsafe fn data_bytes(&self) -> &[u8] {
        if self.mData.is_null() || self.mDataLength == 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.mData as *const u8, self.mDataLength as usize) }
    }
}

#[repr(C)]
pub struct aiMaterial {
    pub mProperties: *mut *mut aiMaterialProperty,
    pub mNumProperties: c_uint,
    pub mNumAllocated: c_uint,
}

/// `aiScene` 的前缀部分，止于 `mCameras`
#[repr(C)]
pub struct aiScene {
    pub mFlags: c_uint,
    pub mRootNode: *mut aiNode,
    pub mNumMeshes: c_uint,
    pub mMeshes: *mut *mut aiMesh,
    pub mNumMaterials: c_uint,
    pub mMaterials: *mut *mut aiMaterial,
    pub mNumAnimations: c_uint,
    pub mAnimations: *mut *mut c_void,
    pub mNumTextures: c_uint,
    pub mTextures: *mut *mut c_void,
    pub mNumLights: c_uint,
    pub mLights: *mut *mut c_void,
    pub mNumCameras: c_uint,
    pub mCameras: *mut *mut c_void,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_string_round_trip() {
        let s = aiString::new("?mat.name");
        assert_eq!(s.length, 9);
        assert_eq!(s.as_bytes(), b"?mat.name");
        assert_eq!(s.to_string_lossy(), "?mat.name");
    }

    #[test]
    fn test_ai_string_truncates_to_maxlen() {
        let long = "x".repeat(MAXLEN + 10);
        let s = aiString::new(&long);
        assert_eq!(s.length as usize, MAXLEN - 1);
        assert_eq!(s.data[MAXLEN - 1], 0);
    }

    #[test]
    fn test_matrix_rows_are_row_major() {
        let m = aiMatrix4x4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]);
        assert_eq!(m.a4, 4.0);
        assert_eq!(m.b1, 5.0);
        assert_eq!(m.to_rows()[3], [13.0, 14.0, 15.0, 16.0]);
    }

    #[test]
    fn test_vector_layout_matches_arrays() {
        assert_eq!(size_of::<aiVector3D>(), size_of::<[f32; 3]>());
        assert_eq!(size_of::<aiColor4D>(), size_of::<[f32; 4]>());
        assert_eq!(size_of::<aiMatrix4x4>(), size_of::<[[f32; 4]; 4]>());
        assert_eq!(size_of::<aiString>(), 4 + MAXLEN);
    }
}
