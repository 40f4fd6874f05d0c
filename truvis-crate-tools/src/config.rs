//! TOML 配置文件读取

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// 从 TOML 文件加载配置
pub fn load_toml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> anyhow::Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("读取配置文件失败: {:?}", path))?;

    parse_toml(&content).with_context(|| format!("解析 TOML 配置失败: {:?}", path))
}

/// 如果文件不存在则返回 `None`，存在但解析失败时返回错误
pub fn load_toml_if_exists<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> anyhow::Result<Option<T>> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("config file {:?} not found, using defaults", path);
        return Ok(None);
    }
    load_toml(path).map(Some)
}

/// 解析 TOML 文本
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    Ok(toml::from_str(content)?)
}
