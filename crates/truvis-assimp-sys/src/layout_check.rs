//! 由 bindgen 生成的绑定，仅用于校验 `types.rs` 的内存布局

#[allow(clippy::all, warnings)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/assimp_bindings.rs"));
}
