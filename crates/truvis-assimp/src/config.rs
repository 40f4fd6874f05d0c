//! `truvis-assimp.toml`
//!
//! ```toml
//! library_path = "/usr/lib/x86_64-linux-gnu/libassimp.so.5"
//! default_flags = ["TRIANGULATE", "GEN_SMOOTH_NORMALS", "FLIP_UVS"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::importer::Importer;
use crate::postprocess::PostProcess;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// 为空时按 [`truvis_assimp_sys::AssimpLibrary::load_default`] 的顺序查找
    pub library_path: Option<PathBuf>,
    /// 每一项都按 [`PostProcess::parse`] 解析
    pub default_flags: Vec<String>,
}

impl ImportConfig {
    /// 文件不存在时使用默认配置
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(truvis_crate_tools::config::load_toml_if_exists(path)?.unwrap_or_default())
    }

    pub fn flags(&self) -> Result<PostProcess> {
        self.default_flags
            .iter()
            .try_fold(PostProcess::empty(), |acc, text| -> Result<PostProcess> { Ok(acc | PostProcess::parse(text)?) })
    }

    pub fn importer(&self) -> Result<Importer> {
        match &self.library_path {
            Some(path) => Importer::from_library_path(path),
            None => Importer::new(),
        }
    }
}
