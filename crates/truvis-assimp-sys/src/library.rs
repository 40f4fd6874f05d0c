use std::ffi::{CStr, CString, c_char, c_int, c_uint};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::types::{aiScene, aiString};

/// 显式指定 Assimp 动态库路径的环境变量
pub const LIBRARY_ENV: &str = "TRUVIS_ASSIMP_LIB";

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &["assimp.dll", "assimp-vc143-mt.dll", "assimp-vc142-mt.dll", "libassimp.dll"];
#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "libassimp.dylib",
    "libassimp.6.dylib",
    "libassimp.5.dylib",
    "/opt/homebrew/lib/libassimp.dylib",
    "/usr/local/lib/libassimp.dylib",
];
#[cfg(all(unix, not(target_os = "macos")))]
const CANDIDATES: &[&str] = &["libassimp.so", "libassimp.so.6", "libassimp.so.5"];

type ImportFileFn = unsafe extern "C" fn(*const c_char, c_uint) -> *const aiScene;
type ReleaseImportFn = unsafe extern "C" fn(*const aiScene);
type GetErrorStringFn = unsafe extern "C" fn() -> *const c_char;
type GetVersionFn = unsafe extern "C" fn() -> c_uint;
type IsExtensionSupportedFn = unsafe extern "C" fn(*const c_char) -> c_int;
type GetExtensionListFn = unsafe extern "C" fn(*mut aiString);

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("failed to open native Assimp library (tried {tried:?}): {reason}")]
    NotFound { tried: Vec<String>, reason: String },

    #[error("native Assimp library {path:?} has no symbol `{symbol}`")]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

/// 一次 `aiImportFile` 调用的原始结果
///
/// `error` 是与这次调用在同一把锁内读取到的 `aiGetErrorString`，成功时通常为空。
pub struct RawImport {
    pub scene: *const aiScene,
    pub error: String,
}

/// 原生导入引擎的接口
///
/// 生产环境下由 [`AssimpLibrary`] 实现；测试中可以在内存里构造 `aiScene` 来替代。
pub trait ImportBackend: Send + Sync {
    /// 导入文件，返回原生场景指针（可能为空）以及错误信息
    fn import_file(&self, path: &CStr, flags: u32) -> RawImport;

    /// 释放由 [`ImportBackend::import_file`] 返回的场景
    ///
    /// # Safety
    /// `scene` 必须来自同一个 backend 的 `import_file`，并且只能释放一次。空指针是允许的。
    unsafe fn release_import(&self, scene: *const aiScene);
}

/// 运行时加载的 Assimp 动态库
///
/// 所有符号在加载时一次性解析。`aiGetErrorString` 是进程级的全局状态，
/// 因此导入与读取错误信息在同一把锁内完成。
pub struct AssimpLibrary {
    path: PathBuf,

    import_file: ImportFileFn,
    release_import: ReleaseImportFn,
    get_error_string: GetErrorStringFn,
    get_version_major: GetVersionFn,
    get_version_minor: GetVersionFn,
    get_version_patch: GetVersionFn,
    is_extension_supported: IsExtensionSupportedFn,
    get_extension_list: GetExtensionListFn,

    lock: Mutex<()>,

    // 必须最后 drop：上面的函数指针都指向这个库
    _library: libloading::Library,
}

impl AssimpLibrary {
    /// 按顺序尝试：环境变量 `TRUVIS_ASSIMP_LIB`，然后是当前平台的常见库名
    pub fn load_default() -> Result<Self, LibraryError> {
        let mut tried = Vec::new();
        let mut reason = String::from("no candidate");

        let env_path = std::env::var_os(LIBRARY_ENV).map(PathBuf::from);
        let candidates = env_path.into_iter().chain(CANDIDATES.iter().map(PathBuf::from));

        for candidate in candidates {
            match Self::load(&candidate) {
                Ok(library) => return Ok(library),
                Err(LibraryError::NotFound { reason: r, .. }) => {
                    log::debug!("assimp library candidate {:?} rejected: {}", candidate, r);
                    tried.push(candidate.display().to_string());
                    reason = r;
                }
                // 库存在但符号不全：不再继续尝试，直接报告
                Err(e) => return Err(e),
            }
        }

        Err(LibraryError::NotFound { tried, reason })
    }

    /// 打开指定路径的动态库
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref().to_path_buf();

        // SAFETY: Assimp 的初始化例程没有额外的前置条件
        let library = unsafe { libloading::Library::new(&path) }.map_err(|e| LibraryError::NotFound {
            tried: vec![path.display().to_string()],
            reason: e.to_string(),
        })?;

        macro_rules! symbol {
            ($name:literal, $ty:ty) => {{
                // SAFETY: 符号签名与 assimp/cimport.h 中的声明一致
                let sym = unsafe { library.get::<$ty>(concat!($name, "\0").as_bytes()) }.map_err(|source| {
                    LibraryError::MissingSymbol {
                        path: path.clone(),
                        symbol: $name,
                        source,
                    }
                })?;
                *sym
            }};
        }

        let import_file = symbol!("aiImportFile", ImportFileFn);
        let release_import = symbol!("aiReleaseImport", ReleaseImportFn);
        let get_error_string = symbol!("aiGetErrorString", GetErrorStringFn);
        let get_version_major = symbol!("aiGetVersionMajor", GetVersionFn);
        let get_version_minor = symbol!("aiGetVersionMinor", GetVersionFn);
        let get_version_patch = symbol!("aiGetVersionPatch", GetVersionFn);
        let is_extension_supported = symbol!("aiIsExtensionSupported", IsExtensionSupportedFn);
        let get_extension_list = symbol!("aiGetExtensionList", GetExtensionListFn);

        let assimp = Self {
            path,
            import_file,
            release_import,
            get_error_string,
            get_version_major,
            get_version_minor,
            get_version_patch,
            is_extension_supported,
            get_extension_list,
            lock: Mutex::new(()),
            _library: library,
        };

        let (major, minor, patch) = assimp.version();
        log::info!("loaded assimp {}.{}.{} from {:?}", major, minor, patch, assimp.path);

        Ok(assimp)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// (major, minor, patch)
    pub fn version(&self) -> (u32, u32, u32) {
        // SAFETY: 无参数的纯查询函数
        unsafe { ((self.get_version_major)(), (self.get_version_minor)(), (self.get_version_patch)()) }
    }

    /// `ext` 形如 `"obj"`、`".obj"` 或 `"*.obj"`
    pub fn is_extension_supported(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('*').trim_start_matches('.');
        let Ok(ext) = CString::new(format!(".{}", ext)) else {
            return false;
        };
        let _guard = self.lock.lock();
        // SAFETY: ext 是以 NUL 结尾的有效字符串
        unsafe { (self.is_extension_supported)(ext.as_ptr()) != 0 }
    }

    /// 所有支持的扩展名，例如 `["*.3ds", "*.obj", ...]`
    pub fn extension_list(&self) -> Vec<String> {
        let mut out = aiString::default();
        {
            let _guard = self.lock.lock();
            // SAFETY: out 是一个完整的 aiString，由 Assimp 写入
            unsafe { (self.get_extension_list)(&mut out) };
        }
        out.to_string_lossy().split(';').filter(|s| !s.is_empty()).map(str::to_owned).collect()
    }

    fn error_string(&self) -> String {
        // SAFETY: 返回值为 NULL 或者 Assimp 内部持有的以 NUL 结尾的字符串
        unsafe {
            let ptr = (self.get_error_string)();
            if ptr.is_null() {
                String::new()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        }
    }
}

impl ImportBackend for AssimpLibrary {
    fn import_file(&self, path: &CStr, flags: u32) -> RawImport {
        let _guard = self.lock.lock();
        // SAFETY: path 是以 NUL 结尾的有效字符串
        let scene = unsafe { (self.import_file)(path.as_ptr(), flags) };
        let error = self.error_string();
        RawImport { scene, error }
    }

    unsafe fn release_import(&self, scene: *const aiScene) {
        if scene.is_null() {
            return;
        }
        // SAFETY: 由调用者保证 scene 来自 aiImportFile 且尚未释放
        unsafe { (self.release_import)(scene) };
    }
}

impl std::fmt::Debug for AssimpLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssimpLibrary").field("path", &self.path).finish()
    }
}
