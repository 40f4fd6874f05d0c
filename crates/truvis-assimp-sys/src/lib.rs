//! Assimp C 接口的底层绑定
//!
//! - [`types`]: 手写的 `#[repr(C)]` 结构体，与 Assimp 5.x 头文件的内存布局一致
//! - [`library`]: 通过 `libloading` 在运行时加载 Assimp 动态库，并抽象出 [`ImportBackend`]
//!
//! 开启 `bindgen` feature 后，`build.rs` 会根据系统头文件生成绑定，并在测试中逐字段校验布局。

pub mod library;
pub mod types;

#[cfg(feature = "bindgen")]
mod layout_check;

pub use library::{AssimpLibrary, ImportBackend, LIBRARY_ENV, LibraryError, RawImport};
pub use types::*;
