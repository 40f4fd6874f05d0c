use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use truvis_assimp_sys::{ImportBackend, aiScene};

use crate::error::{ImportError, Result};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::node::{Node, NodeId};
use crate::postprocess::{PostProcess, SceneFlags};

/// 原生引擎返回的场景
///
/// 只有导入成功（非空）的场景才会被包装；drop 时调用且只调用一次 `release_import`。
pub(crate) struct NativeScene {
    ptr: NonNull<aiScene>,
    backend: Arc<dyn ImportBackend>,
}

// SAFETY: 原生场景在释放前不会再被修改，所有访问都是只读的
unsafe impl Send for NativeScene {}
unsafe impl Sync for NativeScene {}

impl NativeScene {
    /// 空指针返回 `None`
    ///
    /// # Safety
    /// `ptr` 必须来自 `backend.import_file`，且所有权转移给返回值
    pub(crate) unsafe fn new(ptr: *const aiScene, backend: Arc<dyn ImportBackend>) -> Option<Self> {
        NonNull::new(ptr as *mut aiScene).map(|ptr| Self { ptr, backend })
    }

    pub(crate) fn raw(&self) -> &aiScene {
        // SAFETY: 非空，并且在 self 存活期间不会被释放
        unsafe { self.ptr.as_ref() }
    }
}

impl Drop for NativeScene {
    fn drop(&mut self) {
        log::debug!("release native scene {:p}", self.ptr);
        // SAFETY: ptr 来自同一个 backend，且 NativeScene 只会 drop 一次
        unsafe { self.backend.release_import(self.ptr.as_ptr()) };
    }
}

/// 把原生的 `(指针, 数量)` 数组视为切片，空指针视为空数组
///
/// # Safety
/// `ptr` 非空时必须指向 `len` 个有效元素，并且在返回的切片存活期间保持有效
pub(crate) unsafe fn c_array<'a, T>(ptr: *const T, len: u32) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len as usize) }
    }
}

/// 导入后的场景
///
/// 网格、材质、节点在导入时一次性构建完成；顶点数据仍留在原生内存中，通过 [`crate::BufferView`] 访问。
/// clone 只增加引用计数。
#[derive(Clone)]
pub struct Scene {
    inner: Arc<SceneData>,
}

struct SceneData {
    path: PathBuf,
    post_process: PostProcess,
    flags: SceneFlags,

    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    /// 深度优先前序，`nodes[0]` 为根节点
    nodes: Vec<Node>,

    num_animations: u32,
    num_textures: u32,
    num_lights: u32,
    num_cameras: u32,

    _native: Arc<NativeScene>,
}

impl Scene {
    /// 从原生场景构建；出错时 `native` 随之 drop，原生场景被释放
    pub(crate) fn from_native(native: Arc<NativeScene>, path: &Path, post_process: PostProcess) -> Result<Self> {
        crate::profile_span!("Scene::from_native");

        let raw = native.raw();

        // SAFETY: 数组长度由原生场景给出
        let raw_meshes = unsafe { c_array(raw.mMeshes, raw.mNumMeshes) };
        let meshes = raw_meshes
            .iter()
            .enumerate()
            .map(|(index, &mesh)| {
                // SAFETY: 指针来自原生场景，与 native 同生命周期
                let mesh = unsafe { mesh.as_ref() }
                    .ok_or_else(|| ImportError::Malformed(format!("mesh {index} is null")))?;
                Mesh::from_raw(&native, index, mesh)
            })
            .collect::<Result<Vec<_>>>()?;

        // SAFETY: 同上
        let raw_materials = unsafe { c_array(raw.mMaterials, raw.mNumMaterials) };
        let materials = raw_materials
            .iter()
            .enumerate()
            .map(|(index, &material)| {
                // SAFETY: 同上
                let material = unsafe { material.as_ref() }
                    .ok_or_else(|| ImportError::Malformed(format!("material {index} is null")))?;
                Ok(Material::from_raw(material))
            })
            .collect::<Result<Vec<_>>>()?;

        // SAFETY: 同上
        let root = unsafe { raw.mRootNode.as_ref() }.ok_or_else(|| ImportError::Malformed("root node is null".to_string()))?;
        let nodes = Node::collect(root)?;

        let flags = SceneFlags::from_bits_retain(raw.mFlags);
        let (num_animations, num_textures, num_lights, num_cameras) =
            (raw.mNumAnimations, raw.mNumTextures, raw.mNumLights, raw.mNumCameras);

        let scene = SceneData {
            path: path.to_path_buf(),
            post_process,
            flags,
            meshes,
            materials,
            nodes,
            num_animations,
            num_textures,
            num_lights,
            num_cameras,
            _native: native,
        };

        Ok(Self { inner: Arc::new(scene) })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// 导入时使用的后处理选项
    pub fn post_process(&self) -> PostProcess {
        self.inner.post_process
    }

    pub fn flags(&self) -> SceneFlags {
        self.inner.flags
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.inner.meshes
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.inner.meshes.get(index)
    }

    pub fn materials(&self) -> &[Material] {
        &self.inner.materials
    }

    pub fn material(&self, index: usize) -> Option<&Material> {
        self.inner.materials.get(index)
    }

    /// 网格引用的材质
    pub fn mesh_material(&self, mesh: &Mesh) -> Option<&Material> {
        self.material(mesh.material_index() as usize)
    }

    /// 所有节点，深度优先前序
    pub fn nodes(&self) -> &[Node] {
        &self.inner.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.inner.nodes[id.index()]
    }

    pub fn root_node(&self) -> &Node {
        &self.inner.nodes[0]
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children().iter().map(|id| self.node(*id))
    }

    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent().map(|id| self.node(id))
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.inner.nodes.iter().find(|node| node.name() == name)
    }

    pub fn num_meshes(&self) -> usize {
        self.inner.meshes.len()
    }

    pub fn num_materials(&self) -> usize {
        self.inner.materials.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn num_animations(&self) -> u32 {
        self.inner.num_animations
    }

    /// 内嵌纹理数量
    pub fn num_textures(&self) -> u32 {
        self.inner.num_textures
    }

    pub fn num_lights(&self) -> u32 {
        self.inner.num_lights
    }

    pub fn num_cameras(&self) -> u32 {
        self.inner.num_cameras
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("path", &self.inner.path)
            .field("flags", &self.inner.flags)
            .field("meshes", &self.inner.meshes.len())
            .field("materials", &self.inner.materials.len())
            .field("nodes", &self.inner.nodes.len())
            .finish()
    }
}
