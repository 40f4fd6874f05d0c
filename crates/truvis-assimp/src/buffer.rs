use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::scene::NativeScene;

/// 缓冲区中单个元素的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementFormat {
    F32x3,
    F32x4,
    U32x3,
}

impl ElementFormat {
    /// 单个分量的字节数
    pub fn item_size(self) -> usize {
        4
    }

    pub fn components(self) -> usize {
        match self {
            ElementFormat::F32x3 | ElementFormat::U32x3 => 3,
            ElementFormat::F32x4 => 4,
        }
    }

    /// 单个元素的字节数
    pub fn stride(self) -> usize {
        self.item_size() * self.components()
    }

    /// 分量格式码：`f` 为 f32，`I` 为 u32
    pub fn format_code(self) -> char {
        match self {
            ElementFormat::F32x3 | ElementFormat::F32x4 => 'f',
            ElementFormat::U32x3 => 'I',
        }
    }
}

/// 指向原生场景内部数据的只读视图
///
/// 不拷贝数据；视图持有原生场景的引用计数，因此在视图存活期间场景不会被释放，
/// 即使对应的 [`crate::Scene`] 已经被 drop。
pub struct BufferView<T> {
    owner: Arc<NativeScene>,
    ptr: NonNull<T>,
    len: usize,
    format: ElementFormat,
}

// SAFETY: 数据只读，且生命周期由 owner 保证
unsafe impl<T: Sync> Send for BufferView<T> {}
unsafe impl<T: Sync> Sync for BufferView<T> {}

impl<T: bytemuck::Pod> BufferView<T> {
    /// 空指针返回 `None`
    ///
    /// # Safety
    /// `ptr` 非空时必须指向 `len` 个连续的、已初始化的 `T`，并且在 `owner` 释放前保持有效且不被修改。
    pub(crate) unsafe fn new(owner: &Arc<NativeScene>, ptr: *const T, len: usize, format: ElementFormat) -> Option<Self> {
        debug_assert_eq!(size_of::<T>(), format.stride());
        let ptr = NonNull::new(ptr as *mut T)?;
        // 零长度时不保留原生指针
        let ptr = if len == 0 { NonNull::dangling() } else { ptr };
        Some(Self {
            owner: owner.clone(),
            ptr,
            len,
            format,
        })
    }

    pub(crate) fn empty(owner: &Arc<NativeScene>, format: ElementFormat) -> Self {
        Self {
            owner: owner.clone(),
            ptr: NonNull::dangling(),
            len: 0,
            format,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: 见 new 的约束；len 为 0 时 ptr 为 dangling，也是合法的
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    pub fn format(&self) -> ElementFormat {
        self.format
    }

    /// 元素个数（不是字节数）
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len * self.format.stride()
    }
}

impl<const N: usize> BufferView<[f32; N]>
where
    [f32; N]: bytemuck::Pod,
{
    /// 按分量展开，`[x0, y0, z0, x1, ...]`
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<T: bytemuck::Pod> Deref for BufferView<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> Clone for BufferView<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            ptr: self.ptr,
            len: self.len,
            format: self.format,
        }
    }
}

impl<T> fmt::Debug for BufferView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView").field("len", &self.len).field("format", &self.format).finish()
    }
}
