use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// One contiguous chunk of system memory owned by a region.
#[derive(Debug)]
pub(crate) struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Block {
    /// Returns `None` when the layout is invalid or the system is out of memory.
    pub(crate) fn acquire(capacity: usize, align: usize) -> Option<Self> {
        let layout = Layout::from_size_align(capacity.max(1), align).ok()?;
        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).map(|ptr| Self { ptr, layout })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Whether `size` bytes aligned to `align` fit in an empty block.
    #[inline]
    pub(crate) fn fits(&self, size: usize, align: usize) -> bool {
        let padding = if align > self.layout.align() { align } else { 0 };
        size.checked_add(padding)
            .is_some_and(|needed| needed <= self.capacity())
    }

    /// Offset of the first `align`-aligned byte at or after `cursor`.
    #[inline]
    pub(crate) fn aligned_offset(&self, cursor: usize, align: usize) -> Option<usize> {
        let addr = (self.ptr.as_ptr() as usize).checked_add(cursor)?;
        let padding = addr.wrapping_neg() & (align - 1);
        cursor.checked_add(padding)
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc::alloc` with exactly this layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}
