use bitflags::Flags;

use crate::error::{ImportError, Result};

bitflags::bitflags! {
    /// 后处理选项，取值与 `aiPostProcessSteps` 一致
    ///
    /// 由原始 `u32` 构造时使用 [`PostProcess::from_bits_retain`]，未知的位会原样传给原生引擎。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PostProcess: u32 {
        const CALC_TANGENT_SPACE = 0x1;
        const JOIN_IDENTICAL_VERTICES = 0x2;
        const MAKE_LEFT_HANDED = 0x4;
        const TRIANGULATE = 0x8;
        const REMOVE_COMPONENT = 0x10;
        const GEN_NORMALS = 0x20;
        const GEN_SMOOTH_NORMALS = 0x40;
        const SPLIT_LARGE_MESHES = 0x80;
        const PRE_TRANSFORM_VERTICES = 0x100;
        const LIMIT_BONE_WEIGHTS = 0x200;
        const VALIDATE_DATA_STRUCTURE = 0x400;
        const IMPROVE_CACHE_LOCALITY = 0x800;
        const REMOVE_REDUNDANT_MATERIALS = 0x1000;
        const FIX_INFACING_NORMALS = 0x2000;
        const POPULATE_ARMATURE_DATA = 0x4000;
        const SORT_BY_PTYPE = 0x8000;
        const FIND_DEGENERATES = 0x10000;
        const FIND_INVALID_DATA = 0x20000;
        const GEN_UV_COORDS = 0x40000;
        const TRANSFORM_UV_COORDS = 0x80000;
        const FIND_INSTANCES = 0x100000;
        const OPTIMIZE_MESHES = 0x200000;
        const OPTIMIZE_GRAPH = 0x400000;
        const FLIP_UVS = 0x800000;
        const FLIP_WINDING_ORDER = 0x1000000;
        const SPLIT_BY_BONE_COUNT = 0x2000000;
        const DEBONE = 0x4000000;
        const GLOBAL_SCALE = 0x8000000;
        const EMBED_TEXTURES = 0x10000000;
        const FORCE_GEN_NORMALS = 0x20000000;
        const DROP_NORMALS = 0x40000000;
        const GEN_BOUNDING_BOXES = 0x80000000;
    }
}

impl PostProcess {
    pub const CONVERT_TO_LEFT_HANDED: Self = Self::MAKE_LEFT_HANDED.union(Self::FLIP_UVS).union(Self::FLIP_WINDING_ORDER);

    pub const TARGET_REALTIME_FAST: Self = Self::CALC_TANGENT_SPACE
        .union(Self::GEN_NORMALS)
        .union(Self::JOIN_IDENTICAL_VERTICES)
        .union(Self::TRIANGULATE)
        .union(Self::GEN_UV_COORDS)
        .union(Self::SORT_BY_PTYPE);

    pub const TARGET_REALTIME_QUALITY: Self = Self::CALC_TANGENT_SPACE
        .union(Self::GEN_SMOOTH_NORMALS)
        .union(Self::JOIN_IDENTICAL_VERTICES)
        .union(Self::IMPROVE_CACHE_LOCALITY)
        .union(Self::LIMIT_BONE_WEIGHTS)
        .union(Self::REMOVE_REDUNDANT_MATERIALS)
        .union(Self::SPLIT_LARGE_MESHES)
        .union(Self::TRIANGULATE)
        .union(Self::GEN_UV_COORDS)
        .union(Self::SORT_BY_PTYPE)
        .union(Self::FIND_DEGENERATES)
        .union(Self::FIND_INVALID_DATA);

    pub const TARGET_REALTIME_MAX_QUALITY: Self = Self::TARGET_REALTIME_QUALITY
        .union(Self::FIND_INSTANCES)
        .union(Self::VALIDATE_DATA_STRUCTURE)
        .union(Self::OPTIMIZE_MESHES);

    const PRESETS: &'static [(&'static str, PostProcess)] = &[
        ("CONVERT_TO_LEFT_HANDED", Self::CONVERT_TO_LEFT_HANDED),
        ("TARGET_REALTIME_FAST", Self::TARGET_REALTIME_FAST),
        ("TARGET_REALTIME_QUALITY", Self::TARGET_REALTIME_QUALITY),
        ("TARGET_REALTIME_MAX_QUALITY", Self::TARGET_REALTIME_MAX_QUALITY),
    ];

    /// 解析 `"TRIANGULATE | FLIP_UVS"` 形式的文本
    ///
    /// 分隔符可以是 `|`、`,` 或空白；名字不区分大小写，下划线可省略，
    /// 因此 `GenSmoothNormals`、`aiProcess_GenSmoothNormals` 与 `GEN_SMOOTH_NORMALS` 等价。
    /// 也接受十进制或 `0x` 开头的十六进制数字。
    pub fn parse(text: &str) -> Result<Self> {
        let mut flags = Self::empty();
        for token in text.split(|c: char| c == '|' || c == ',' || c.is_whitespace()) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            flags |= Self::parse_token(token)
                .ok_or_else(|| ImportError::InvalidArgument(format!("unknown post-process flag `{token}`")))?;
        }
        Ok(flags)
    }

    fn parse_token(token: &str) -> Option<Self> {
        if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            return u32::from_str_radix(hex, 16).ok().map(Self::from_bits_retain);
        }
        if token.bytes().all(|b| b.is_ascii_digit()) {
            return token.parse().ok().map(Self::from_bits_retain);
        }

        let wanted = normalize(token);
        let wanted = wanted
            .strip_prefix("AIPROCESS")
            .or_else(|| wanted.strip_prefix("PROCESS"))
            .unwrap_or(&wanted);

        Self::FLAGS
            .iter()
            .map(|flag| (flag.name(), *flag.value()))
            .chain(Self::PRESETS.iter().copied())
            .find(|(name, _)| normalize(name) == wanted)
            .map(|(_, value)| value)
    }
}

fn normalize(name: &str) -> String {
    name.chars().filter(|c| *c != '_').map(|c| c.to_ascii_uppercase()).collect()
}

impl From<u32> for PostProcess {
    fn from(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

bitflags::bitflags! {
    /// `aiMesh::mPrimitiveTypes`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PrimitiveTypes: u32 {
        const POINT = 0x1;
        const LINE = 0x2;
        const TRIANGLE = 0x4;
        const POLYGON = 0x8;
        const NGON_ENCODING_FLAG = 0x10;
    }
}

bitflags::bitflags! {
    /// `aiScene::mFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SceneFlags: u32 {
        const INCOMPLETE = 0x1;
        const VALIDATED = 0x2;
        const VALIDATION_WARNING = 0x4;
        const NON_VERBOSE_FORMAT = 0x8;
        const TERRAIN = 0x10;
        const ALLOW_SHARED = 0x20;
    }
}
