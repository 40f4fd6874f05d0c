/// 读取系统安装的 Assimp 头文件，生成绑定到 `$OUT_DIR/assimp_bindings.rs`
///
/// 生成的绑定只用于校验 `types.rs` 中手写的内存布局，运行时并不依赖它。
#[cfg(feature = "bindgen")]
fn gen_rust_binding() {
    let include_dir = std::env::var("ASSIMP_INCLUDE_DIR").unwrap_or_else(|_| "/usr/include".to_string());

    let bindings = bindgen::Builder::default()
        .header_contents(
            "truvis_assimp_wrapper.h",
            "#include <assimp/cimport.h>\n#include <assimp/scene.h>\n#include <assimp/material.h>\n",
        )
        .clang_arg(format!("-I{}", include_dir))
        .allowlist_type("aiScene|aiNode|aiMesh|aiFace|aiString|aiMatrix4x4|aiVector3D|aiColor4D|aiAABB")
        .allowlist_type("aiMaterial|aiMaterialProperty")
        .derive_default(true)
        .layout_tests(false)
        // Tell cargo to invalidate the built crate whenever any of the
        // included header files changed.
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate bindings");

    let out_path = std::path::PathBuf::from(std::env::var("OUT_DIR").unwrap()).join("assimp_bindings.rs");
    bindings.write_to_file(out_path).expect("Couldn't write bindings!");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ASSIMP_INCLUDE_DIR");

    #[cfg(feature = "bindgen")]
    gen_rust_binding();
}
