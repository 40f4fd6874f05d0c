//! 在内存中按原生布局构造 `aiScene`，替代真实的 Assimp

use std::ffi::{CStr, c_char};
use std::path::PathBuf;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use parking_lot::Mutex;
use truvis_assimp_sys::*;
use truvis_crate_tools::resource::TruvisPath;

use crate::Importer;
use crate::material::TextureType;

/// 测试用的模型文件：内容无关紧要，只需要存在
pub fn model_file(name: &str) -> PathBuf {
    let dir = TruvisPath::temp_dir().join("truvis-assimp-tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"# fake model\n").unwrap();
    path
}

#[derive(Clone, Default)]
pub struct FakeMesh {
    pub name: String,
    pub material_index: u32,
    pub primitive_types: u32,
    pub vertices: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub bitangents: Option<Vec<[f32; 3]>>,
    /// (通道, 有效分量数, 数据)
    pub texcoords: Vec<(usize, u32, Vec<[f32; 3]>)>,
    pub colors: Vec<(usize, Vec<[f32; 4]>)>,
    pub faces: Vec<Vec<u32>>,
    /// 保留顶点数，但 `mVertices` 写为空指针
    pub null_positions: bool,
    /// 保留面数，但 `mFaces` 写为空指针
    pub null_faces: bool,
}

#[derive(Clone)]
pub struct FakeProperty {
    pub key: String,
    pub semantic: u32,
    pub index: u32,
    pub ty: i32,
    pub data: Vec<u8>,
}

impl FakeProperty {
    pub fn string(key: &str, value: &str) -> Self {
        let mut data = (value.len() as u32).to_ne_bytes().to_vec();
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        Self {
            key: key.to_string(),
            semantic: 0,
            index: 0,
            ty: aiPTI_String,
            data,
        }
    }

    pub fn floats(key: &str, values: &[f32]) -> Self {
        Self {
            key: key.to_string(),
            semantic: 0,
            index: 0,
            ty: aiPTI_Float,
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }

    pub fn int(key: &str, value: i32) -> Self {
        Self {
            key: key.to_string(),
            semantic: 0,
            index: 0,
            ty: aiPTI_Integer,
            data: value.to_ne_bytes().to_vec(),
        }
    }

    pub fn buffer(key: &str, data: &[u8]) -> Self {
        Self {
            key: key.to_string(),
            semantic: 0,
            index: 0,
            ty: aiPTI_Buffer,
            data: data.to_vec(),
        }
    }

    pub fn texture(texture_type: TextureType, index: u32, path: &str) -> Self {
        Self::texture_raw(texture_type.as_raw(), index, path)
    }

    pub fn texture_raw(semantic: u32, index: u32, path: &str) -> Self {
        Self {
            semantic,
            index,
            ..Self::string("$tex.file", path)
        }
    }
}

#[derive(Clone)]
pub struct FakeNode {
    pub name: String,
    /// 行主序
    pub transform: [[f32; 4]; 4],
    pub meshes: Vec<u32>,
    pub children: Vec<FakeNode>,
    /// 在父节点的 `mChildren` 中写为空指针
    pub null_in_parent: bool,
}

impl FakeNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: aiMatrix4x4::IDENTITY.to_rows(),
            meshes: Vec::new(),
            children: Vec::new(),
            null_in_parent: false,
        }
    }

    pub fn with_child(mut self, child: FakeNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Clone, Default)]
pub struct FakeScene {
    pub flags: u32,
    pub meshes: Vec<FakeMesh>,
    pub materials: Vec<Vec<FakeProperty>>,
    pub root: Option<FakeNode>,
    /// 这些下标在 `mMeshes` 中写为空指针
    pub null_meshes: Vec<usize>,
    /// 这些下标在 `mMaterials` 中写为空指针
    pub null_materials: Vec<usize>,
}

impl FakeScene {
    /// 一个四边形（两个三角形），两个材质，三个节点
    pub fn quad() -> Self {
        let mesh = FakeMesh {
            name: "quad".to_string(),
            material_index: 1,
            primitive_types: 0x4,
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Some(vec![[0.0, 0.0, 1.0]; 4]),
            tangents: None,
            bitangents: None,
            texcoords: vec![(0, 2, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]])],
            colors: vec![(1, vec![[1.0, 1.0, 1.0, 0.5]; 4])],
            faces: vec![vec![0, 1, 2], vec![0, 2, 3]],
            null_positions: false,
            null_faces: false,
        };

        let default_material = vec![FakeProperty::string("?mat.name", "DefaultMaterial")];
        let quad_material = vec![
            FakeProperty::string("?mat.name", "quad_material"),
            FakeProperty::floats("$clr.diffuse", &[0.8, 0.7, 0.6]),
            FakeProperty::floats("$clr.specular", &[0.9, 0.9, 0.9]),
            FakeProperty::floats("$clr.emissive", &[0.0, 0.0, 0.0, 1.0]),
            FakeProperty::floats("$mat.shininess", &[32.0]),
            FakeProperty::int("$mat.shadingm", 2),
            FakeProperty::texture(TextureType::Diffuse, 0, "texture_diffuse.png"),
            FakeProperty::texture(TextureType::Specular, 0, "texture_specular.png"),
            FakeProperty::texture(TextureType::Height, 0, "bumpmap.png"),
            FakeProperty::buffer("$raw.blob", &[1, 2, 3]),
        ];

        let mut quad_node = FakeNode::new("quad");
        quad_node.meshes = vec![0];
        quad_node.transform = [
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 2.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let root = FakeNode::new("root").with_child(quad_node).with_child(FakeNode::new("camera_target"));

        Self {
            flags: AI_SCENE_FLAGS_VALIDATED,
            meshes: vec![mesh],
            materials: vec![default_material, quad_material],
            root: Some(root),
            null_meshes: Vec::new(),
            null_materials: Vec::new(),
        }
    }
}

/// 一次导入产生的全部原生内存
///
/// 各个原生结构体通过指针互相引用，因此数据都放在堆上，且在释放前不再移动。
#[derive(Default)]
struct OwnedScene {
    scene: Option<Box<aiScene>>,
    meshes: Vec<Box<aiMesh>>,
    mesh_ptrs: Vec<*mut aiMesh>,
    vec3s: Vec<Vec<aiVector3D>>,
    colors: Vec<Vec<aiColor4D>>,
    faces: Vec<Vec<aiFace>>,
    u32s: Vec<Vec<u32>>,
    materials: Vec<Box<aiMaterial>>,
    material_ptrs: Vec<*mut aiMaterial>,
    properties: Vec<Box<aiMaterialProperty>>,
    property_lists: Vec<Vec<*mut aiMaterialProperty>>,
    bytes: Vec<Vec<u8>>,
    nodes: Vec<Box<aiNode>>,
    node_lists: Vec<Vec<*mut aiNode>>,
}

// SAFETY: 只在持有 FakeBackend 锁时创建与销毁
unsafe impl Send for OwnedScene {}

impl OwnedScene {
    fn build(desc: &FakeScene) -> Self {
        let mut owned = Self::default();

        for (index, mesh) in desc.meshes.iter().enumerate() {
            let mesh = owned.build_mesh(mesh);
            owned.mesh_ptrs.push(if desc.null_meshes.contains(&index) { ptr::null_mut() } else { mesh });
        }
        for (index, material) in desc.materials.iter().enumerate() {
            let material = owned.build_material(material);
            owned.material_ptrs.push(if desc.null_materials.contains(&index) { ptr::null_mut() } else { material });
        }
        let root = desc.root.as_ref().map_or(ptr::null_mut(), |root| owned.build_node(root, ptr::null_mut()));

        owned.scene = Some(Box::new(aiScene {
            mFlags: desc.flags,
            mRootNode: root,
            mNumMeshes: owned.mesh_ptrs.len() as u32,
            mMeshes: owned.mesh_ptrs.as_mut_ptr(),
            mNumMaterials: owned.material_ptrs.len() as u32,
            mMaterials: owned.material_ptrs.as_mut_ptr(),
            mNumAnimations: 0,
            mAnimations: ptr::null_mut(),
            mNumTextures: 0,
            mTextures: ptr::null_mut(),
            mNumLights: 0,
            mLights: ptr::null_mut(),
            mNumCameras: 0,
            mCameras: ptr::null_mut(),
        }));
        owned
    }

    fn scene_ptr(&self) -> *const aiScene {
        self.scene.as_deref().map_or(ptr::null(), |s| s as *const aiScene)
    }

    fn keep_vec3(&mut self, data: &[[f32; 3]]) -> *mut aiVector3D {
        let mut data: Vec<aiVector3D> = data.iter().map(|v| bytemuck::cast(*v)).collect();
        let ptr = data.as_mut_ptr();
        self.vec3s.push(data);
        ptr
    }

    fn keep_opt_vec3(&mut self, data: &Option<Vec<[f32; 3]>>) -> *mut aiVector3D {
        data.as_deref().map_or(ptr::null_mut(), |data| self.keep_vec3(data))
    }

    fn keep_u32(&mut self, data: &[u32]) -> *mut u32 {
        let mut data = data.to_vec();
        let ptr = data.as_mut_ptr();
        self.u32s.push(data);
        ptr
    }

    fn build_mesh(&mut self, desc: &FakeMesh) -> *mut aiMesh {
        let mut texture_coords = [ptr::null_mut(); AI_MAX_NUMBER_OF_TEXTURECOORDS];
        let mut num_uv_components = [0; AI_MAX_NUMBER_OF_TEXTURECOORDS];
        for (channel, components, data) in &desc.texcoords {
            texture_coords[*channel] = self.keep_vec3(data);
            num_uv_components[*channel] = *components;
        }

        let mut colors = [ptr::null_mut(); AI_MAX_NUMBER_OF_COLOR_SETS];
        for (channel, data) in &desc.colors {
            let mut data: Vec<aiColor4D> = data.iter().map(|c| bytemuck::cast(*c)).collect();
            colors[*channel] = data.as_mut_ptr();
            self.colors.push(data);
        }

        let mut faces: Vec<aiFace> = desc
            .faces
            .iter()
            .map(|face| aiFace {
                mNumIndices: face.len() as u32,
                mIndices: self.keep_u32(face),
            })
            .collect();
        let faces_ptr = if desc.null_faces { ptr::null_mut() } else { faces.as_mut_ptr() };
        self.faces.push(faces);

        let mut mesh = Box::new(aiMesh {
            mPrimitiveTypes: desc.primitive_types,
            mNumVertices: desc.vertices.len() as u32,
            mNumFaces: desc.faces.len() as u32,
            mVertices: if desc.null_positions { ptr::null_mut() } else { self.keep_vec3(&desc.vertices) },
            mNormals: self.keep_opt_vec3(&desc.normals),
            mTangents: self.keep_opt_vec3(&desc.tangents),
            mBitangents: self.keep_opt_vec3(&desc.bitangents),
            mColors: colors,
            mTextureCoords: texture_coords,
            mNumUVComponents: num_uv_components,
            mFaces: faces_ptr,
            mNumBones: 0,
            mBones: ptr::null_mut(),
            mMaterialIndex: desc.material_index,
            mName: aiString::new(&desc.name),
            mNumAnimMeshes: 0,
            mAnimMeshes: ptr::null_mut(),
            mMethod: 0,
            mAABB: aiAABB::default(),
        });
        let ptr = &mut *mesh as *mut aiMesh;
        self.meshes.push(mesh);
        ptr
    }

    fn build_material(&mut self, desc: &[FakeProperty]) -> *mut aiMaterial {
        let mut list = Vec::with_capacity(desc.len());
        for prop in desc {
            let mut data = prop.data.clone();
            let data_ptr = data.as_mut_ptr() as *mut c_char;
            self.bytes.push(data);

            let mut property = Box::new(aiMaterialProperty {
                mKey: aiString::new(&prop.key),
                mSemantic: prop.semantic,
                mIndex: prop.index,
                mDataLength: prop.data.len() as u32,
                mType: prop.ty,
                mData: data_ptr,
            });
            list.push(&mut *property as *mut aiMaterialProperty);
            self.properties.push(property);
        }

        let mut material = Box::new(aiMaterial {
            mProperties: list.as_mut_ptr(),
            mNumProperties: list.len() as u32,
            mNumAllocated: list.capacity() as u32,
        });
        self.property_lists.push(list);
        let ptr = &mut *material as *mut aiMaterial;
        self.materials.push(material);
        ptr
    }

    fn build_node(&mut self, desc: &FakeNode, parent: *mut aiNode) -> *mut aiNode {
        let mesh_ptr = self.keep_u32(&desc.meshes);
        let mut node = Box::new(aiNode {
            mName: aiString::new(&desc.name),
            mTransformation: aiMatrix4x4::from_rows(desc.transform),
            mParent: parent,
            mNumChildren: 0,
            mChildren: ptr::null_mut(),
            mNumMeshes: desc.meshes.len() as u32,
            mMeshes: mesh_ptr,
            mMetaData: ptr::null_mut(),
        });
        let node_ptr = &mut *node as *mut aiNode;
        self.nodes.push(node);

        let mut children: Vec<*mut aiNode> = desc
            .children
            .iter()
            .map(|child| {
                let child_ptr = self.build_node(child, node_ptr);
                if child.null_in_parent { ptr::null_mut() } else { child_ptr }
            })
            .collect();
        // SAFETY: node_ptr 指向 self.nodes 中的 Box，地址稳定
        unsafe {
            (*node_ptr).mNumChildren = children.len() as u32;
            (*node_ptr).mChildren = children.as_mut_ptr();
        }
        self.node_lists.push(children);
        node_ptr
    }
}

/// 内存中的原生引擎，记录导入与释放次数
pub struct FakeBackend {
    scene: Option<FakeScene>,
    error: Mutex<String>,
    live: Mutex<Vec<OwnedScene>>,
    imports: AtomicUsize,
    releases: AtomicUsize,
    last_flags: AtomicU32,
}

impl FakeBackend {
    pub fn new(scene: Option<FakeScene>) -> Arc<Self> {
        Arc::new(Self {
            scene,
            error: Mutex::new(String::new()),
            live: Mutex::new(Vec::new()),
            imports: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            last_flags: AtomicU32::new(0),
        })
    }

    pub fn importer(scene: FakeScene) -> (Arc<Self>, Importer) {
        let backend = Self::new(Some(scene));
        let importer = Importer::with_backend(backend.clone());
        (backend, importer)
    }

    /// 每次导入都返回空指针和给定的错误信息
    pub fn failing(error: &str) -> (Arc<Self>, Importer) {
        let backend = Self::new(None);
        backend.set_error(error);
        let importer = Importer::with_backend(backend.clone());
        (backend, importer)
    }

    pub fn set_error(&self, error: &str) {
        *self.error.lock() = error.to_string();
    }

    pub fn imports(&self) -> usize {
        self.imports.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn last_flags(&self) -> u32 {
        self.last_flags.load(Ordering::SeqCst)
    }

    /// 尚未释放的场景数量
    pub fn live(&self) -> usize {
        self.live.lock().len()
    }
}

impl ImportBackend for FakeBackend {
    fn import_file(&self, _path: &CStr, flags: u32) -> RawImport {
        self.imports.fetch_add(1, Ordering::SeqCst);
        self.last_flags.store(flags, Ordering::SeqCst);

        let error = self.error.lock().clone();
        let Some(desc) = &self.scene else {
            return RawImport {
                scene: ptr::null(),
                error,
            };
        };

        let owned = OwnedScene::build(desc);
        let scene = owned.scene_ptr();
        self.live.lock().push(owned);
        RawImport { scene, error }
    }

    unsafe fn release_import(&self, scene: *const aiScene) {
        if scene.is_null() {
            return;
        }
        self.releases.fetch_add(1, Ordering::SeqCst);

        let mut live = self.live.lock();
        let position = live.iter().position(|owned| ptr::eq(owned.scene_ptr(), scene));
        match position {
            Some(position) => drop(live.swap_remove(position)),
            None => panic!("release of unknown or already released scene {scene:p}"),
        }
    }
}
