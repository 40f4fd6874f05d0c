use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use truvis_assimp::config::ImportConfig;
use truvis_assimp::{Importer, Node, PostProcess, Scene};
use truvis_crate_tools::resource::TruvisPath;

/// 导入模型并打印场景概要
#[derive(Parser, Debug)]
#[command(name = "scene-info", version)]
struct Args {
    /// 模型文件
    file: PathBuf,

    /// 后处理选项，例如 "TRIANGULATE | GEN_SMOOTH_NORMALS"；未指定时使用配置文件中的 default_flags
    #[arg(long)]
    flags: Option<String>,

    /// 配置文件，默认为工作区根目录下的 truvis-assimp.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Assimp 动态库路径，优先于配置文件
    #[arg(long)]
    library: Option<PathBuf>,

    /// 打印材质的全部属性
    #[arg(long)]
    properties: bool,

    /// 列出原生库支持的扩展名后退出
    #[arg(long)]
    extensions: bool,
}

fn main() -> anyhow::Result<()> {
    truvis_crate_tools::init_log::init_log();

    #[cfg(feature = "profiling")]
    let _tracy = tracy_client::Client::start();

    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(TruvisPath::config_path);
    let mut config = ImportConfig::load(&config_path).with_context(|| format!("failed to load {:?}", config_path))?;
    if let Some(library) = &args.library {
        config.library_path = Some(library.clone());
    }

    let importer: Importer = config.importer().context("failed to load the native Assimp library")?;
    if let Some((major, minor, patch)) = importer.version() {
        log::info!("assimp {}.{}.{}", major, minor, patch);
    }

    if args.extensions {
        log::info!("supported extensions: {}", importer.extension_list().join(" "));
        return Ok(());
    }

    let flags = match &args.flags {
        Some(text) => PostProcess::parse(text)?,
        None => config.flags()?,
    };

    let scene = importer.import_file(&args.file, flags).with_context(|| format!("failed to import {:?}", args.file))?;
    print_scene(&scene, args.properties);

    Ok(())
}

fn print_scene(scene: &Scene, properties: bool) {
    log::info!(
        "{:?}: {} meshes, {} materials, {} nodes, {} animations, {} textures, {} lights, {} cameras",
        scene.path(),
        scene.num_meshes(),
        scene.num_materials(),
        scene.num_nodes(),
        scene.num_animations(),
        scene.num_textures(),
        scene.num_lights(),
        scene.num_cameras()
    );

    for mesh in scene.meshes() {
        log::info!(
            "mesh[{}] `{}`: {} vertices, {} faces, normals: {}, tangents: {}, uv channels: {:?}, color channels: {}, material: {}",
            mesh.index(),
            mesh.name(),
            mesh.num_vertices(),
            mesh.num_faces(),
            mesh.normals().is_some(),
            mesh.tangents().is_some(),
            mesh.num_uv_components(),
            mesh.colors().len(),
            mesh.material_index()
        );
    }

    for (index, material) in scene.materials().iter().enumerate() {
        log::info!("material[{}] `{}`", index, material.name().unwrap_or("<unnamed>"));
        for (texture_type, paths) in material.textures() {
            log::info!("    {:?}: {:?}", texture_type, paths);
        }
        if properties {
            for (key, value) in material.properties() {
                log::info!("    {} ({}) = {:?}", key, key.display_name().unwrap_or("-"), value);
            }
        }
    }

    print_node(scene, scene.root_node(), 0);
}

fn print_node(scene: &Scene, node: &Node, depth: usize) {
    log::info!("{}{} meshes: {:?}", "  ".repeat(depth), node.name(), node.mesh_indices());
    for child in scene.children(node) {
        print_node(scene, child, depth + 1);
    }
}
