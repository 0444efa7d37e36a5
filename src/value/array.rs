use std::fmt;

use allocator_api2::vec::Vec as RegionVec;
use serde::ser::{Serialize, Serializer};

use crate::arena::{Region, RegionAlloc};
use crate::{Error, Result};

use super::Value;

/// Ordered sequence of values whose node storage lives in a [`Region`].
#[derive(PartialEq)]
pub struct Array<'a> {
    items: RegionVec<Value<'a>, RegionAlloc<'a>>,
}

impl<'a> Array<'a> {
    pub fn new_in(region: &'a Region) -> Self {
        Self {
            items: RegionVec::new_in(region.allocator()),
        }
    }

    pub fn push(&mut self, value: Value<'a>) -> Result<()> {
        self.items
            .try_reserve(1)
            .map_err(|err| Error::allocation(format!("array growth failed: {err}")))?;
        self.items.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value<'a>> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value<'a>> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value<'a>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value<'a>> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Value<'a>] {
        &self.items
    }

    pub fn region(&self) -> &'a Region {
        self.items.allocator().region()
    }

    /// Deep copy placed in the same region.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::new_in(self.region());
        copy.items
            .try_reserve(self.items.len())
            .map_err(|err| Error::allocation(format!("array copy failed: {err}")))?;
        for item in self.iter() {
            copy.items.push(item.try_clone()?);
        }
        Ok(copy)
    }
}

impl<'s, 'a> IntoIterator for &'s Array<'a> {
    type Item = &'s Value<'a>;
    type IntoIter = std::slice::Iter<'s, Value<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Array<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Serialize for Array<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
