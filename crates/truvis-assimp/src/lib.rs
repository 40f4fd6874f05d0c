//! Assimp 模型导入
//!
//! 调用原生 Assimp 导入模型文件，把原生场景转换为只读、可在线程间共享的 Rust 类型。
//! 顶点数据不做拷贝，[`BufferView`] 直接指向原生内存，并持有原生场景的引用计数；
//! 最后一个持有者 drop 时原生场景才会被释放。
//!
//! ```ignore
//! let scene = truvis_assimp::import_file("cube.obj", PostProcess::TRIANGULATE)?;
//! for mesh in scene.meshes() {
//!     let positions: &[[f32; 3]] = &mesh.vertices();
//!     let indices: &[u32] = mesh.indices_flat();
//! }
//! ```
//!
//! 原生库的位置见 [`truvis_assimp_sys::AssimpLibrary::load_default`]。

/// 开启 `profiling` feature 且 tracy client 正在运行时记录一个 span
macro_rules! profile_span {
    ($name:literal) => {
        #[cfg(feature = "profiling")]
        let _span = tracy_client::Client::running().map(|client| client.span(tracy_client::span_location!($name), 0));
    };
}
pub(crate) use profile_span;

pub mod buffer;
pub mod config;
pub mod error;
pub mod importer;
pub mod material;
pub mod mesh;
pub mod node;
pub mod postprocess;
pub mod scene;

#[cfg(test)]
mod test_scene;

pub use buffer::{BufferView, ElementFormat};
pub use error::{ErrorKind, ImportError, Result};
pub use importer::{Importer, import_file, shared_importer};
pub use material::{Color, Material, PropertyKey, PropertyValue, TextureType};
pub use mesh::{Aabb, ColorChannel, Mesh, TexCoordChannel};
pub use node::{Node, NodeId};
pub use postprocess::{PostProcess, PrimitiveTypes, SceneFlags};
pub use scene::Scene;

pub use truvis_assimp_sys as sys;
