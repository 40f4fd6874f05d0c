use truvis_assimp_sys::aiNode;

use crate::error::{ImportError, Result};
use crate::scene::c_array;

/// 节点在 [`crate::Scene::nodes`] 中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 场景图中的一个节点
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: String,
    /// 行主序，与原生 `aiMatrix4x4` 一致
    transformation: [[f32; 4]; 4],
    parent: Option<NodeId>,
    parent_name: Option<String>,
    children: Vec<NodeId>,
    mesh_indices: Vec<u32>,
}

impl Node {
    /// 深度优先、前序遍历整棵树，子节点保持原生顺序
    pub(crate) fn collect(root: &aiNode) -> Result<Vec<Node>> {
        crate::profile_span!("Node::collect");

        let mut nodes = Vec::new();
        Self::visit(root, None, &mut nodes)?;
        Ok(nodes)
    }

    fn visit(raw: &aiNode, parent: Option<NodeId>, nodes: &mut Vec<Node>) -> Result<NodeId> {
        let id = NodeId(nodes.len());

        // SAFETY: 指针来自原生场景
        let parent_name = unsafe { raw.mParent.as_ref() }.map(|p| p.mName.to_string_lossy());
        // SAFETY: mMeshes 有 mNumMeshes 个元素
        let mesh_indices = unsafe { c_array(raw.mMeshes, raw.mNumMeshes) }.to_vec();

        nodes.push(Node {
            id,
            name: raw.mName.to_string_lossy(),
            transformation: raw.mTransformation.to_rows(),
            parent,
            parent_name,
            children: Vec::with_capacity(raw.mNumChildren as usize),
            mesh_indices,
        });

        // SAFETY: mChildren 有 mNumChildren 个元素
        let children = unsafe { c_array(raw.mChildren, raw.mNumChildren) };
        for (i, &child) in children.iter().enumerate() {
            // SAFETY: 同上
            let child = unsafe { child.as_ref() }
                .ok_or_else(|| ImportError::Malformed(format!("child {i} of node {} is null", nodes[id.0].name)))?;
            let child_id = Self::visit(child, Some(id), nodes)?;
            nodes[id.0].children.push(child_id);
        }

        Ok(id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 行主序的原始矩阵
    pub fn transformation(&self) -> &[[f32; 4]; 4] {
        &self.transformation
    }

    /// 相对于父节点的变换
    pub fn transform(&self) -> glam::Mat4 {
        glam::Mat4::from_cols_array_2d(&self.transformation).transpose()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// 指向 [`crate::Scene::meshes`] 的下标
    pub fn mesh_indices(&self) -> &[u32] {
        &self.mesh_indices
    }

    pub fn num_meshes(&self) -> usize {
        self.mesh_indices.len()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
