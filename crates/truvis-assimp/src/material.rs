use std::collections::BTreeMap;

use indexmap::IndexMap;
use truvis_assimp_sys::{aiMaterial, aiMaterialProperty, aiPTI_Buffer, aiPTI_Double, aiPTI_Float, aiPTI_Integer, aiPTI_String};

use crate::scene::c_array;

/// `aiTextureType`
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextureType {
    None = 0,
    Diffuse = 1,
    Specular = 2,
    Ambient = 3,
    Emissive = 4,
    Height = 5,
    Normals = 6,
    Shininess = 7,
    Opacity = 8,
    Displacement = 9,
    Lightmap = 10,
    Reflection = 11,
    BaseColor = 12,
    NormalCamera = 13,
    EmissionColor = 14,
    Metalness = 15,
    DiffuseRoughness = 16,
    AmbientOcclusion = 17,
    Unknown = 18,
    Sheen = 19,
    Clearcoat = 20,
    Transmission = 21,
}

impl TextureType {
    pub const ALL: [TextureType; 22] = [
        TextureType::None,
        TextureType::Diffuse,
        TextureType::Specular,
        TextureType::Ambient,
        TextureType::Emissive,
        TextureType::Height,
        TextureType::Normals,
        TextureType::Shininess,
        TextureType::Opacity,
        TextureType::Displacement,
        TextureType::Lightmap,
        TextureType::Reflection,
        TextureType::BaseColor,
        TextureType::NormalCamera,
        TextureType::EmissionColor,
        TextureType::Metalness,
        TextureType::DiffuseRoughness,
        TextureType::AmbientOcclusion,
        TextureType::Unknown,
        TextureType::Sheen,
        TextureType::Clearcoat,
        TextureType::Transmission,
    ];

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// 材质属性的键，与原生的 `(mKey, mSemantic, mIndex)` 一一对应
///
/// 非纹理属性的 `semantic` 与 `index` 均为 0。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey {
    pub key: String,
    pub semantic: u32,
    pub index: u32,
}

impl PropertyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            semantic: 0,
            index: 0,
        }
    }

    pub fn texture(key: impl Into<String>, texture_type: TextureType, index: u32) -> Self {
        Self {
            key: key.into(),
            semantic: texture_type.as_raw(),
            index,
        }
    }

    /// 纹理相关属性的槽位类型
    pub fn texture_type(&self) -> Option<TextureType> {
        if self.key.starts_with("$tex.") { TextureType::from_raw(self.semantic) } else { None }
    }

    /// 便于阅读的别名，例如 `$clr.diffuse` -> `COLOR_DIFFUSE`；未知的键返回 `None`
    pub fn display_name(&self) -> Option<&'static str> {
        display_name(&self.key)
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.semantic == 0 && self.index == 0 {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}[{},{}]", self.key, self.semantic, self.index)
        }
    }
}

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("?mat.name", "NAME"),
    ("$mat.twosided", "TWOSIDED"),
    ("$mat.shadingm", "SHADING_MODEL"),
    ("$mat.wireframe", "ENABLE_WIREFRAME"),
    ("$mat.blend", "BLEND_FUNC"),
    ("$mat.opacity", "OPACITY"),
    ("$mat.bumpscaling", "BUMPSCALING"),
    ("$mat.shininess", "SHININESS"),
    ("$mat.reflectivity", "REFLECTIVITY"),
    ("$mat.shinpercent", "SHININESS_STRENGTH"),
    ("$mat.refracti", "REFRACTI"),
    ("$clr.diffuse", "COLOR_DIFFUSE"),
    ("$clr.ambient", "COLOR_AMBIENT"),
    ("$clr.specular", "COLOR_SPECULAR"),
    ("$clr.emissive", "COLOR_EMISSIVE"),
    ("$clr.transparent", "COLOR_TRANSPARENT"),
    ("$clr.reflective", "COLOR_REFLECTIVE"),
    ("?bg.global", "GLOBAL_BACKGROUND_IMAGE"),
    ("$tex.file", "TEXTURE_BASE"),
    ("$tex.mapping", "MAPPING_BASE"),
    ("$tex.flags", "TEXFLAGS_BASE"),
    ("$tex.uvwsrc", "UVWSRC_BASE"),
    ("$tex.mapmodev", "MAPPINGMODE_V_BASE"),
    ("$tex.mapaxis", "TEXMAP_AXIS_BASE"),
    ("$tex.blend", "TEXBLEND_BASE"),
    ("$tex.uvtrafo", "UVTRANSFORM_BASE"),
    ("$tex.op", "TEXOP_BASE"),
    ("$tex.mapmodeu", "MAPPINGMODE_U_BASE"),
];

fn display_name(key: &str) -> Option<&'static str> {
    DISPLAY_NAMES.iter().find(|(raw, _)| *raw == key).map(|(_, name)| *name)
}

/// `$clr.*` 属性
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb([f32; 3]),
    Rgba([f32; 4]),
}

impl Color {
    pub fn rgb(&self) -> [f32; 3] {
        match *self {
            Color::Rgb(rgb) => rgb,
            Color::Rgba([r, g, b, _]) => [r, g, b],
        }
    }

    /// RGB 颜色的 alpha 视为 1.0
    pub fn rgba(&self) -> [f32; 4] {
        match *self {
            Color::Rgb([r, g, b]) => [r, g, b, 1.0],
            Color::Rgba(rgba) => rgba,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Float(f32),
    Floats(Vec<f32>),
    Double(f64),
    Doubles(Vec<f64>),
    Integer(i32),
    Integers(Vec<i32>),
    Color(Color),
    /// `aiPTI_Buffer` 以及未知类型的原始字节
    Buffer(Vec<u8>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// 单个浮点数，双精度会被转换为 f32
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            PropertyValue::Float(v) => Some(v),
            PropertyValue::Double(v) => Some(v as f32),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            PropertyValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match *self {
            PropertyValue::Color(c) => Some(c),
            _ => None,
        }
    }

    /// 按 `aiPropertyTypeInfo` 解码原始字节
    pub(crate) fn decode(key: &str, ty: i32, bytes: &[u8]) -> Self {
        match ty {
            aiPTI_String => PropertyValue::String(decode_string(bytes)),
            aiPTI_Float => {
                let values: Vec<f32> = pod_values(bytes);
                match values.as_slice() {
                    [r, g, b] if key.starts_with("$clr.") => PropertyValue::Color(Color::Rgb([*r, *g, *b])),
                    [r, g, b, a] if key.starts_with("$clr.") => PropertyValue::Color(Color::Rgba([*r, *g, *b, *a])),
                    [v] => PropertyValue::Float(*v),
                    _ => PropertyValue::Floats(values),
                }
            }
            aiPTI_Double => {
                let values: Vec<f64> = pod_values(bytes);
                match values.as_slice() {
                    [v] => PropertyValue::Double(*v),
                    _ => PropertyValue::Doubles(values),
                }
            }
            aiPTI_Integer => {
                let values: Vec<i32> = pod_values(bytes);
                match values.as_slice() {
                    [v] => PropertyValue::Integer(*v),
                    _ => PropertyValue::Integers(values),
                }
            }
            aiPTI_Buffer => PropertyValue::Buffer(bytes.to_vec()),
            other => {
                log::warn!("material property `{}` has unknown type {}, kept as raw bytes", key, other);
                PropertyValue::Buffer(bytes.to_vec())
            }
        }
    }
}

/// 原生字符串属性：4 字节长度 + 内容 + NUL
fn decode_string(bytes: &[u8]) -> String {
    let Some((len, rest)) = bytes.split_first_chunk::<4>() else {
        return String::new();
    };
    let len = (u32::from_ne_bytes(*len) as usize).min(rest.len());
    String::from_utf8_lossy(&rest[..len]).into_owned()
}

/// 原生数据不保证对齐，逐元素拷贝；末尾不足一个元素的字节被丢弃
fn pod_values<T: bytemuck::Pod>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(size_of::<T>()).map(bytemuck::pod_read_unaligned).collect()
}

#[derive(Debug, Clone, Default)]
pub struct Material {
    properties: IndexMap<PropertyKey, PropertyValue>,
    textures: BTreeMap<TextureType, Vec<String>>,
}

impl Material {
    pub(crate) fn from_raw(material: &aiMaterial) -> Self {
        crate::profile_span!("Material::from_raw");

        // SAFETY: mProperties 有 mNumProperties 个元素
        let raw_properties = unsafe { c_array(material.mProperties, material.mNumProperties) };

        let mut properties = IndexMap::with_capacity(raw_properties.len());
        for &prop in raw_properties {
            // SAFETY: 属性指针来自原生场景
            let Some(prop) = (unsafe { prop.as_ref() }) else {
                log::warn!("skip null material property");
                continue;
            };
            let (key, value) = Self::read_property(prop);
            properties.insert(key, value);
        }

        let textures = Self::collect_textures(&properties);

        Self { properties, textures }
    }

    fn read_property(prop: &aiMaterialProperty) -> (PropertyKey, PropertyValue) {
        let key = PropertyKey {
            key: prop.mKey.to_string_lossy(),
            semantic: prop.mSemantic,
            index: prop.mIndex,
        };
        // SAFETY: mData 有 mDataLength 字节
        let bytes = unsafe { prop.data_bytes() };
        let value = PropertyValue::decode(&key.key, prop.mType, bytes);
        (key, value)
    }

    /// `$tex.file` 属性按槽位分组，组内按 index 排序
    fn collect_textures(properties: &IndexMap<PropertyKey, PropertyValue>) -> BTreeMap<TextureType, Vec<String>> {
        let mut slots: BTreeMap<TextureType, Vec<(u32, String)>> = BTreeMap::new();

        for (key, value) in properties {
            if key.key != "$tex.file" {
                continue;
            }
            let Some(texture_type) = TextureType::from_raw(key.semantic) else {
                log::warn!("texture `{:?}` has unknown semantic {}, skipped", value, key.semantic);
                continue;
            };
            let Some(path) = value.as_str() else {
                log::warn!("texture property {} is not a string", key);
                continue;
            };
            slots.entry(texture_type).or_default().push((key.index, path.to_owned()));
        }

        slots
            .into_iter()
            .map(|(texture_type, mut paths)| {
                paths.sort_by_key(|(index, _)| *index);
                (texture_type, paths.into_iter().map(|(_, path)| path).collect())
            })
            .collect()
    }

    /// 原生报告的全部属性，保持原有顺序
    pub fn properties(&self) -> &IndexMap<PropertyKey, PropertyValue> {
        &self.properties
    }

    /// 非纹理属性，即 `(key, 0, 0)`
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(&PropertyKey::new(key))
    }

    pub fn get_with(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// 按别名查找，例如 `"COLOR_DIFFUSE"`
    pub fn get_by_display_name(&self, name: &str) -> Option<&PropertyValue> {
        let (raw, _) = DISPLAY_NAMES.iter().find(|(_, display)| *display == name)?;
        self.get(raw)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("?mat.name").and_then(PropertyValue::as_str)
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        self.get(key).and_then(PropertyValue::as_color)
    }

    /// 每种槽位的纹理路径，按 index 排序
    pub fn textures(&self) -> &BTreeMap<TextureType, Vec<String>> {
        &self.textures
    }

    pub fn texture(&self, texture_type: TextureType, index: usize) -> Option<&str> {
        self.textures.get(&texture_type)?.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
