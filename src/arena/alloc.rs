use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};

use allocator_api2::alloc::{AllocError, Allocator};

use super::Region;

/// Container-facing handle that places nodes in a [`Region`].
///
/// Deallocation is a no-op: memory comes back only through
/// [`Region::reset`] or [`Region::release`], which the `'r` borrow keeps
/// from running while any container built on this handle is alive.
#[derive(Clone, Copy)]
pub struct RegionAlloc<'r> {
    region: &'r Region,
}

impl<'r> RegionAlloc<'r> {
    pub fn new(region: &'r Region) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &'r Region {
        self.region
    }
}

impl PartialEq for RegionAlloc<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.region, other.region)
    }
}

impl Eq for RegionAlloc<'_> {}

impl fmt::Debug for RegionAlloc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegionAlloc")
            .field(&(self.region as *const Region))
            .finish()
    }
}

// SAFETY: every pointer handed out stays valid and unmoved until the region
// is reset or released, and both require `&mut Region`, which cannot coexist
// with the shared borrow held here.
unsafe impl Allocator for RegionAlloc<'_> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let ptr = self.region.alloc(layout).map_err(|_| AllocError)?;
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}
