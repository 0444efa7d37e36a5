//! Region allocator backing every container node of a parsed tree.
//!
//! A [`Region`] hands out bump-allocated spans from large blocks and takes
//! them back only in bulk. [`Region::reset`] recycles the blocks for the
//! next parse without touching the system allocator; [`Region::release`]
//! gives them back. Both take `&mut self`, so the borrow checker rejects a
//! reset while any tree built on the region is still reachable.

mod alloc;
mod block;

use std::alloc::Layout;
use std::cell::RefCell;
use std::fmt;
use std::ptr::{self, NonNull};
use std::{slice, str};

use serde::Serialize;
use tracing::{debug, trace};

pub use alloc::RegionAlloc;
use block::Block;

use crate::constants::{DEFAULT_BLOCK_SIZE, REGION_ALIGN};
use crate::{Error, RegionOptions, Result};

#[derive(Debug, Default)]
struct RegionState {
    current: Option<Block>,
    cursor: usize,
    used: Vec<Block>,
    available: Vec<Block>,
    fragment: usize,
    system_allocations: usize,
}

impl RegionState {
    fn bump(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let block = self.current.as_ref()?;
        let start = block.aligned_offset(self.cursor, align)?;
        let end = start.checked_add(size)?;
        if end > block.capacity() {
            return None;
        }
        self.cursor = end;
        // SAFETY: `start < end <= capacity`, so the offset stays inside the block.
        NonNull::new(unsafe { block.base().as_ptr().add(start) })
    }

    fn retire_current(&mut self) {
        if let Some(block) = self.current.take() {
            self.fragment += block.capacity() - self.cursor;
            self.used.push(block);
        }
        self.cursor = 0;
    }

    fn adopt(&mut self, block: Block) {
        self.current = Some(block);
        self.cursor = 0;
    }

    fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.current
            .iter()
            .chain(self.used.iter())
            .chain(self.available.iter())
    }
}

/// Snapshot of a region's memory accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionStats {
    pub block_size: usize,
    pub total_allocated: usize,
    pub used_bytes: usize,
    pub fragment_size: usize,
    pub fragment_rate: f64,
    pub block_count: usize,
    pub available_blocks: usize,
    pub system_allocations: usize,
}

pub struct Region {
    block_size: usize,
    state: RefCell<RegionState>,
}

impl Region {
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: round_up(block_size.max(REGION_ALIGN)).unwrap_or(DEFAULT_BLOCK_SIZE),
            state: RefCell::new(RegionState::default()),
        }
    }

    pub fn with_options(options: &RegionOptions) -> Self {
        Self::with_block_size(options.block_size)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Handle for building containers whose nodes live in this region.
    pub fn allocator(&self) -> RegionAlloc<'_> {
        RegionAlloc::new(self)
    }

    /// Allocates `layout.size()` bytes, rounded up to [`REGION_ALIGN`].
    ///
    /// The span is aligned to at least `REGION_ALIGN` and never overlaps
    /// another live allocation. Running out of system memory is reported as
    /// an `Allocation` error and nothing is retried.
    pub fn alloc(&self, layout: Layout) -> Result<NonNull<u8>> {
        let size = round_up(layout.size().max(1))
            .ok_or_else(|| Error::allocation("allocation size overflow"))?;
        let align = layout.align().max(REGION_ALIGN);

        let mut state = self.state.borrow_mut();
        if let Some(ptr) = state.bump(size, align) {
            return Ok(ptr);
        }

        state.retire_current();
        if let Some(idx) = state
            .available
            .iter()
            .position(|block| block.fits(size, align))
        {
            let block = state.available.remove(idx);
            trace!(capacity = block.capacity(), "reusing region block");
            state.adopt(block);
        } else {
            let padding = if align > REGION_ALIGN { align } else { 0 };
            let capacity = size
                .checked_add(padding)
                .map(|needed| needed.max(self.block_size))
                .ok_or_else(|| Error::allocation("allocation size overflow"))?;
            let block = Block::acquire(capacity, align).ok_or_else(|| {
                Error::allocation(format!("failed to obtain a {capacity}-byte region block"))
            })?;
            state.system_allocations += 1;
            debug!(
                capacity,
                blocks = state.used.len() + state.available.len() + 1,
                "acquired region block"
            );
            state.adopt(block);
        }

        state
            .bump(size, align)
            .ok_or_else(|| Error::allocation("region block too small for request"))
    }

    pub fn alloc_bytes(&self, size: usize) -> Result<NonNull<u8>> {
        let layout = Layout::from_size_align(size, REGION_ALIGN)
            .map_err(|_| Error::allocation("allocation size overflow"))?;
        self.alloc(layout)
    }

    /// Copies `text` into the region.
    pub fn alloc_str(&self, text: &str) -> Result<&str> {
        if text.is_empty() {
            return Ok("");
        }
        let ptr = self.alloc_bytes(text.len())?;
        // SAFETY: the span is freshly allocated, at least `text.len()` bytes,
        // and stays untouched until the region is reset through `&mut self`.
        unsafe {
            ptr::copy_nonoverlapping(text.as_ptr(), ptr.as_ptr(), text.len());
            let bytes = slice::from_raw_parts(ptr.as_ptr(), text.len());
            Ok(str::from_utf8_unchecked(bytes))
        }
    }

    /// Makes every block available again without returning memory to the system.
    pub fn reset(&mut self) {
        let state = self.state.get_mut();
        let mut used = std::mem::take(&mut state.used);
        state.available.append(&mut used);
        state.used = used;
        state.fragment = 0;
        state.cursor = 0;
        debug!(
            available = state.available.len(),
            total = state.blocks().map(Block::capacity).sum::<usize>(),
            "region reset"
        );
    }

    /// Returns every block to the system. The region stays usable.
    pub fn release(&mut self) {
        let state = self.state.get_mut();
        let blocks = state.blocks().count();
        state.current = None;
        state.used.clear();
        state.available.clear();
        state.fragment = 0;
        state.cursor = 0;
        debug!(blocks, "region released");
    }

    /// Frees the reusable blocks, keeping the current and exhausted ones.
    pub fn shrink(&mut self) {
        let state = self.state.get_mut();
        let freed: usize = state.available.iter().map(Block::capacity).sum();
        state.available.clear();
        debug!(freed, "region shrunk");
    }

    pub fn total_allocated(&self) -> usize {
        self.state.borrow().blocks().map(Block::capacity).sum()
    }

    /// Bytes handed out since the last reset, padding and stranded tails included.
    pub fn used_bytes(&self) -> usize {
        let state = self.state.borrow();
        let retired: usize = state.used.iter().map(Block::capacity).sum();
        retired - state.fragment + state.cursor
    }

    pub fn fragment_size(&self) -> usize {
        self.state.borrow().fragment
    }

    pub fn fragment_rate(&self) -> f64 {
        let total = self.total_allocated();
        if total == 0 {
            return 0.0;
        }
        self.fragment_size() as f64 / total as f64
    }

    pub fn block_count(&self) -> usize {
        self.state.borrow().blocks().count()
    }

    pub fn system_allocations(&self) -> usize {
        self.state.borrow().system_allocations
    }

    pub fn stats(&self) -> RegionStats {
        RegionStats {
            block_size: self.block_size,
            total_allocated: self.total_allocated(),
            used_bytes: self.used_bytes(),
            fragment_size: self.fragment_size(),
            fragment_rate: self.fragment_rate(),
            block_count: self.block_count(),
            available_blocks: self.state.borrow().available.len(),
            system_allocations: self.system_allocations(),
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("block_size", &self.block_size)
            .field("stats", &self.stats())
            .finish()
    }
}

#[inline]
fn round_up(size: usize) -> Option<usize> {
    Some(size.checked_add(REGION_ALIGN - 1)? & !(REGION_ALIGN - 1))
}
