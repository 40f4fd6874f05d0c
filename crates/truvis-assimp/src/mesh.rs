use std::sync::Arc;

use itertools::Itertools;
use truvis_assimp_sys::{AI_MAX_NUMBER_OF_COLOR_SETS, AI_MAX_NUMBER_OF_TEXTURECOORDS, aiMesh};

use crate::buffer::{BufferView, ElementFormat};
use crate::error::{ImportError, Result};
use crate::postprocess::PrimitiveTypes;
use crate::scene::{NativeScene, c_array};

/// 轴对齐包围盒；只有开启 `GEN_BOUNDING_BOXES` 时原生引擎才会填写
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// 一组纹理坐标
///
/// 原生数据总是 3 个分量一组，`components` 说明其中有几个有效。
#[derive(Debug, Clone)]
pub struct TexCoordChannel {
    /// 在原生 `mTextureCoords` 中的下标
    pub channel: usize,
    /// 有效分量数，通常为 2
    pub components: u32,
    pub data: BufferView<[f32; 3]>,
}

impl TexCoordChannel {
    /// 每个顶点只保留前 `components` 个分量
    pub fn packed(&self) -> Vec<f32> {
        let n = (self.components as usize).min(3);
        self.data.iter().flat_map(|uvw| uvw[..n].iter().copied()).collect()
    }
}

/// 一组 RGBA 顶点颜色
#[derive(Debug, Clone)]
pub struct ColorChannel {
    /// 在原生 `mColors` 中的下标
    pub channel: usize,
    pub data: BufferView<[f32; 4]>,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    index: usize,
    name: String,
    material_index: u32,
    primitive_types: PrimitiveTypes,
    num_bones: u32,
    aabb: Aabb,

    vertices: BufferView<[f32; 3]>,
    normals: Option<BufferView<[f32; 3]>>,
    tangents: Option<BufferView<[f32; 3]>>,
    bitangents: Option<BufferView<[f32; 3]>>,
    texcoords: Vec<TexCoordChannel>,
    colors: Vec<ColorChannel>,

    /// 三角形索引，导入时一次性展开
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub(crate) fn from_raw(native: &Arc<NativeScene>, index: usize, mesh: &aiMesh) -> Result<Self> {
        crate::profile_span!("Mesh::from_raw");

        let num_vertices = mesh.mNumVertices as usize;

        // aiVector3D 与 [f32; 3] 布局相同
        let vec3_view = |ptr: *mut truvis_assimp_sys::aiVector3D| {
            // SAFETY: 每个非空的顶点属性数组都有 mNumVertices 个元素
            unsafe { BufferView::new(native, ptr as *const [f32; 3], num_vertices, ElementFormat::F32x3) }
        };

        let vertices = match vec3_view(mesh.mVertices) {
            Some(view) => view,
            None if num_vertices == 0 => BufferView::empty(native, ElementFormat::F32x3),
            None => {
                return Err(ImportError::Malformed(format!(
                    "mesh {index} has {num_vertices} vertices but no position data"
                )));
            }
        };

        let texcoords = (0..AI_MAX_NUMBER_OF_TEXTURECOORDS)
            .filter_map(|channel| {
                vec3_view(mesh.mTextureCoords[channel]).map(|data| TexCoordChannel {
                    channel,
                    components: mesh.mNumUVComponents[channel],
                    data,
                })
            })
            .collect_vec();

        let colors = (0..AI_MAX_NUMBER_OF_COLOR_SETS)
            .filter_map(|channel| {
                let ptr = mesh.mColors[channel] as *const [f32; 4];
                // SAFETY: 同上，aiColor4D 与 [f32; 4] 布局相同
                unsafe { BufferView::new(native, ptr, num_vertices, ElementFormat::F32x4) }
                    .map(|data| ColorChannel { channel, data })
            })
            .collect_vec();

        let indices = Self::collect_indices(index, mesh)?;

        let mesh = Self {
            index,
            name: mesh.mName.to_string_lossy(),
            material_index: mesh.mMaterialIndex,
            primitive_types: PrimitiveTypes::from_bits_retain(mesh.mPrimitiveTypes),
            num_bones: mesh.mNumBones,
            aabb: Aabb {
                min: bytemuck::cast(mesh.mAABB.mMin),
                max: bytemuck::cast(mesh.mAABB.mMax),
            },
            vertices,
            normals: vec3_view(mesh.mNormals),
            tangents: vec3_view(mesh.mTangents),
            bitangents: vec3_view(mesh.mBitangents),
            texcoords,
            colors,
            indices,
        };

        log::debug!(
            "mesh {} `{}`: {} vertices, {} faces, {} uv channels, {} color channels, material {}",
            mesh.index,
            mesh.name,
            mesh.num_vertices(),
            mesh.num_faces(),
            mesh.texcoords.len(),
            mesh.colors.len(),
            mesh.material_index
        );

        Ok(mesh)
    }

    /// 每个面都必须是三角形
    fn collect_indices(mesh_index: usize, mesh: &aiMesh) -> Result<Vec<[u32; 3]>> {
        if mesh.mFaces.is_null() && mesh.mNumFaces > 0 {
            return Err(ImportError::Malformed(format!(
                "mesh {mesh_index} has {} faces but no face data",
                mesh.mNumFaces
            )));
        }
        // SAFETY: mFaces 有 mNumFaces 个元素
        let faces = unsafe { c_array(mesh.mFaces, mesh.mNumFaces) };

        faces
            .iter()
            .enumerate()
            .map(|(face_index, face)| {
                if face.mNumIndices != 3 {
                    return Err(ImportError::NonTriangulatedFace {
                        mesh: mesh_index,
                        face: face_index,
                        arity: face.mNumIndices,
                    });
                }
                // SAFETY: 每个面的 mIndices 有 mNumIndices 个元素
                let face_indices = unsafe { c_array(face.mIndices, face.mNumIndices) };
                let [a, b, c] = face_indices else {
                    return Err(ImportError::Malformed(format!(
                        "mesh {mesh_index} face {face_index} has no index data"
                    )));
                };
                Ok([*a, *b, *c])
            })
            .collect()
    }

    /// 在场景网格数组中的下标
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material_index(&self) -> u32 {
        self.material_index
    }

    pub fn primitive_types(&self) -> PrimitiveTypes {
        self.primitive_types
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.indices.len()
    }

    pub fn num_indices(&self) -> usize {
        self.indices.len() * 3
    }

    pub fn num_bones(&self) -> u32 {
        self.num_bones
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn vertices(&self) -> BufferView<[f32; 3]> {
        self.vertices.clone()
    }

    pub fn normals(&self) -> Option<BufferView<[f32; 3]>> {
        self.normals.clone()
    }

    pub fn tangents(&self) -> Option<BufferView<[f32; 3]>> {
        self.tangents.clone()
    }

    pub fn bitangents(&self) -> Option<BufferView<[f32; 3]>> {
        self.bitangents.clone()
    }

    pub fn texcoords(&self) -> &[TexCoordChannel] {
        &self.texcoords
    }

    /// 原生下标为 `channel` 的纹理坐标
    pub fn texcoord_channel(&self, channel: usize) -> Option<&TexCoordChannel> {
        self.texcoords.iter().find(|c| c.channel == channel)
    }

    pub fn colors(&self) -> &[ColorChannel] {
        &self.colors
    }

    pub fn color_channel(&self, channel: usize) -> Option<&ColorChannel> {
        self.colors.iter().find(|c| c.channel == channel)
    }

    /// 每个存在的纹理坐标通道的有效分量数
    pub fn num_uv_components(&self) -> Vec<u32> {
        self.texcoords.iter().map(|c| c.components).collect()
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn indices_flat(&self) -> &[u32] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_format(&self) -> ElementFormat {
        ElementFormat::U32x3
    }
}
