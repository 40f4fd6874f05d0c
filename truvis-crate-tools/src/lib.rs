//! Truvis 工具集
//!
//! 提供日志初始化、路径管理、TOML 配置读取等在各个 crate 之间共享的工具。
//!
//! # TruvisPath
//! 基于工作区根目录的统一路径管理，避免硬编码相对路径。
//!
//! # 配置
//! [`config::load_toml`] 负责读取任意可反序列化的 TOML 配置文件。

pub mod config;
pub mod init_log;
pub mod resource;
