use std::path::PathBuf;

use truvis_assimp_sys::LibraryError;

pub type Result<T, E = ImportError> = std::result::Result<T, E>;

/// 导入失败的三类原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 路径不存在或无法打开
    NotFound,
    /// 原生引擎报告了错误（格式不支持、解析失败、场景不完整），或原生库本身不可用
    Import,
    /// 调用方传入了非法参数，或者导入选项与数据不匹配
    InvalidArgument,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("file not found: {path:?}")]
    FileNotFound { path: PathBuf },

    /// `message` 为 `aiGetErrorString` 的原文
    #[error("Assimp error loading {path:?}: {message}")]
    Import { path: PathBuf, message: String },

    #[error("native scene is malformed: {0}")]
    Malformed(String),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "mesh {mesh} face {face} has {arity} indices, expected a triangle (enable PostProcess::TRIANGULATE)"
    )]
    NonTriangulatedFace { mesh: usize, face: usize, arity: u32 },
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::FileNotFound { .. } => ErrorKind::NotFound,
            ImportError::Import { .. } | ImportError::Malformed(_) | ImportError::Library(_) => ErrorKind::Import,
            ImportError::InvalidArgument(_) | ImportError::NonTriangulatedFace { .. } => ErrorKind::InvalidArgument,
        }
    }
}
