use std::ffi::CString;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use truvis_assimp_sys::{AI_SCENE_FLAGS_INCOMPLETE, AssimpLibrary, ImportBackend};

use crate::error::{ImportError, Result};
use crate::postprocess::PostProcess;
use crate::scene::{NativeScene, Scene};

/// 导入入口
///
/// clone 只增加引用计数；可以在多个线程间共享，原生调用在 backend 内部串行执行。
#[derive(Clone)]
pub struct Importer {
    backend: Arc<dyn ImportBackend>,
    library: Option<Arc<AssimpLibrary>>,
}

impl Importer {
    /// 加载默认位置的 Assimp 动态库，见 [`AssimpLibrary::load_default`]
    pub fn new() -> Result<Self> {
        Ok(Self::from_library(Arc::new(AssimpLibrary::load_default()?)))
    }

    pub fn from_library_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_library(Arc::new(AssimpLibrary::load(path)?)))
    }

    pub fn from_library(library: Arc<AssimpLibrary>) -> Self {
        Self {
            backend: library.clone(),
            library: Some(library),
        }
    }

    /// 使用自定义的原生引擎
    pub fn with_backend(backend: Arc<dyn ImportBackend>) -> Self {
        Self { backend, library: None }
    }

    /// 使用自定义 backend 时为 `None`
    pub fn library(&self) -> Option<&AssimpLibrary> {
        self.library.as_deref()
    }

    pub fn version(&self) -> Option<(u32, u32, u32)> {
        self.library().map(AssimpLibrary::version)
    }

    pub fn is_extension_supported(&self, ext: &str) -> bool {
        self.library().is_some_and(|lib| lib.is_extension_supported(ext))
    }

    pub fn extension_list(&self) -> Vec<String> {
        self.library().map(AssimpLibrary::extension_list).unwrap_or_default()
    }

    /// 导入模型文件
    ///
    /// 失败时原生场景（如果有）已经被释放。
    pub fn import_file(&self, path: impl AsRef<Path>, flags: PostProcess) -> Result<Scene> {
        crate::profile_span!("Importer::import_file");

        let path = path.as_ref();
        let c_path = Self::c_path(path)?;

        // 只检查能否以只读方式打开；目录等能打开的路径交给原生引擎判断
        if let Err(e) = std::fs::File::open(path) {
            log::debug!("cannot open {:?}: {}", path, e);
            return Err(ImportError::FileNotFound { path: path.to_path_buf() });
        }

        log::info!("import {:?} with {:?}", path, flags);

        let raw = {
            crate::profile_span!("aiImportFile");
            self.backend.import_file(&c_path, flags.bits())
        };

        // SAFETY: 指针刚由 backend 返回，所有权交给 NativeScene
        let Some(native) = (unsafe { NativeScene::new(raw.scene, self.backend.clone()) }) else {
            return Err(ImportError::Import {
                path: path.to_path_buf(),
                message: raw.error,
            });
        };

        let scene_flags = native.raw().mFlags;
        if native.raw().mRootNode.is_null() || scene_flags & AI_SCENE_FLAGS_INCOMPLETE != 0 {
            log::warn!("incomplete scene from {:?} (flags {:#x}): {}", path, scene_flags, raw.error);
            // native 在此处 drop，原生场景被释放
            return Err(ImportError::Import {
                path: path.to_path_buf(),
                message: raw.error,
            });
        }

        let scene = Scene::from_native(Arc::new(native), path, flags)?;

        log::info!(
            "imported {:?}: {} meshes, {} materials, {} nodes",
            path,
            scene.num_meshes(),
            scene.num_materials(),
            scene.num_nodes()
        );

        Ok(scene)
    }

    fn c_path(path: &Path) -> Result<CString> {
        let text = path
            .to_str()
            .ok_or_else(|| ImportError::InvalidArgument(format!("path {:?} is not valid UTF-8", path)))?;
        CString::new(text).map_err(|_| ImportError::InvalidArgument(format!("path {:?} contains a NUL byte", path)))
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer").field("library", &self.library).finish()
    }
}

static SHARED: OnceLock<Importer> = OnceLock::new();

/// 进程内共享的 [`Importer`]，第一次成功加载动态库后不再变化
///
/// 加载失败不会被缓存，下次调用会重新尝试。
pub fn shared_importer() -> Result<&'static Importer> {
    if let Some(importer) = SHARED.get() {
        return Ok(importer);
    }
    let importer = Importer::new()?;
    Ok(SHARED.get_or_init(|| importer))
}

/// 使用 [`shared_importer`] 导入文件
pub fn import_file(path: impl AsRef<Path>, flags: PostProcess) -> Result<Scene> {
    shared_importer()?.import_file(path, flags)
}
