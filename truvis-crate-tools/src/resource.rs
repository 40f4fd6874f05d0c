use std::path::{Path, PathBuf};

/// 统一路径管理
///
/// 所有路径基于工作区根目录（通过 `CARGO_MANIFEST_DIR` 推导）。
/// 避免使用硬编码相对路径，确保在不同构建环境下路径一致。
///
/// # 使用示例
/// ```ignore
/// let model = TruvisPath::assets_path("cube.obj");          // assets/cube.obj
/// let config = TruvisPath::config_path();                   // truvis-assimp.toml
/// ```
pub struct TruvisPath {}
// 核心路径
impl TruvisPath {
    /// 获取工作区根目录
    pub fn workspace_path() -> PathBuf {
        // truvis-crate-tools 位于工作区根目录下一层
        Path::new(env!("CARGO_MANIFEST_DIR")).parent().map(Path::to_path_buf).unwrap_or_default()
    }

    pub fn target_path() -> PathBuf {
        Self::workspace_path().join("target")
    }

    /// 测试与调试时产生的临时文件目录: `target/tmp`
    pub fn temp_dir() -> PathBuf {
        Self::target_path().join("tmp")
    }
}
// 根目录下
impl TruvisPath {
    /// 获取 `assets/` 目录下的文件路径
    pub fn assets_path(filename: &str) -> PathBuf {
        Self::workspace_path().join("assets").join(filename)
    }

    /// 默认的配置文件: `truvis-assimp.toml`
    pub fn config_path() -> PathBuf {
        Self::workspace_path().join("truvis-assimp.toml")
    }
}
