use std::fmt;

use allocator_api2::vec::Vec as RegionVec;
use serde::ser::{Serialize, Serializer};

use crate::arena::{Region, RegionAlloc};
use crate::{Error, Result};

use super::{JsonStr, Value};

/// Mapping from unique string keys to values, iterated in byte-wise key order.
///
/// Entries are kept sorted in a region-backed vector; lookups are binary
/// searches. Inserting a key that is already present is an error.
#[derive(PartialEq)]
pub struct Dict<'a> {
    entries: RegionVec<(JsonStr<'a>, Value<'a>), RegionAlloc<'a>>,
}

impl<'a> Dict<'a> {
    pub fn new_in(region: &'a Region) -> Self {
        Self {
            entries: RegionVec::new_in(region.allocator()),
        }
    }

    fn search(&self, key: &str) -> std::result::Result<usize, usize> {
        self.entries
            .binary_search_by(|(probe, _)| probe.as_str().cmp(key))
    }

    fn insert_at(&mut self, pos: usize, key: JsonStr<'a>, value: Value<'a>) -> Result<()> {
        self.entries
            .try_reserve(1)
            .map_err(|err| Error::allocation(format!("dict growth failed: {err}")))?;
        self.entries.insert(pos, (key, value));
        Ok(())
    }

    /// Builds a dict from entries already in strictly ascending key order,
    /// reserving once instead of shifting on every insert.
    pub(crate) fn from_sorted<I>(region: &'a Region, entries: I) -> Result<Self>
    where
        I: ExactSizeIterator<Item = (JsonStr<'a>, Value<'a>)>,
    {
        let mut dict = Self::new_in(region);
        dict.entries
            .try_reserve_exact(entries.len())
            .map_err(|err| Error::allocation(format!("dict growth failed: {err}")))?;
        dict.entries.extend(entries);
        debug_assert!(dict
            .entries
            .windows(2)
            .all(|pair| pair[0].0.as_str() < pair[1].0.as_str()));
        Ok(dict)
    }

    /// Adds a new entry. Fails with `DuplicateKey` if `key` is already present.
    pub fn insert(&mut self, key: impl Into<JsonStr<'a>>, value: Value<'a>) -> Result<&mut Value<'a>> {
        let key = key.into();
        match self.search(key.as_str()) {
            Ok(_) => Err(Error::duplicate_key(key.as_str())),
            Err(pos) => {
                self.insert_at(pos, key, value)?;
                Ok(&mut self.entries[pos].1)
            }
        }
    }

    /// Returns the value for `key`, inserting `Null` first if it is absent.
    pub fn entry(&mut self, key: impl Into<JsonStr<'a>>) -> Result<&mut Value<'a>> {
        let key = key.into();
        let pos = match self.search(key.as_str()) {
            Ok(pos) => pos,
            Err(pos) => {
                self.insert_at(pos, key, Value::Null)?;
                pos
            }
        };
        Ok(&mut self.entries[pos].1)
    }

    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        let pos = self.search(key).ok()?;
        Some(&self.entries[pos].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value<'a>> {
        let pos = self.search(key).ok()?;
        Some(&mut self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.search(key).is_ok()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value<'a>> {
        let pos = self.search(key).ok()?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JsonStr<'a>, &Value<'a>)> + '_ {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value<'a>> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn region(&self) -> &'a Region {
        self.entries.allocator().region()
    }

    /// Deep copy placed in the same region.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::new_in(self.region());
        copy.entries
            .try_reserve(self.entries.len())
            .map_err(|err| Error::allocation(format!("dict copy failed: {err}")))?;
        for (key, value) in self.entries.iter() {
            copy.entries.push((*key, value.try_clone()?));
        }
        Ok(copy)
    }
}

impl fmt::Debug for Dict<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (key.as_str(), value)))
            .finish()
    }
}

impl Serialize for Dict<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(key, value)| (key.as_str(), value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[rstest::rstest]
    fn test_iteration_is_key_sorted() {
        let region = Region::new();
        let mut dict = Dict::new_in(&region);
        dict.insert("zeta", Value::Number(1.0)).unwrap();
        dict.insert("alpha", Value::Number(2.0)).unwrap();
        dict.insert("Mid", Value::Number(3.0)).unwrap();
        let keys: Vec<&str> = dict.keys().collect();
        assert_eq!(keys, ["Mid", "alpha", "zeta"]);
    }

    #[rstest::rstest]
    fn test_duplicate_insert_fails_without_overwrite() {
        let region = Region::new();
        let mut dict = Dict::new_in(&region);
        dict.insert("a", Value::Number(1.0)).unwrap();
        let err = dict.insert("a", Value::Number(2.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateKey);
        assert_eq!(dict.get("a").and_then(Value::as_f64), Some(1.0));
        assert_eq!(dict.len(), 1);
    }

    #[rstest::rstest]
    fn test_from_sorted_keeps_order_and_lookups() {
        let region = Region::new();
        let entries = [("a", 1.0), ("b", 2.0), ("c", 3.0)]
            .into_iter()
            .map(|(key, n)| (JsonStr::from(key), Value::Number(n)));
        let mut dict = Dict::from_sorted(&region, entries).unwrap();
        assert_eq!(dict.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(dict.get("b").and_then(Value::as_f64), Some(2.0));

        dict.insert("ab", Value::Null).unwrap();
        assert_eq!(dict.keys().collect::<Vec<_>>(), ["a", "ab", "b", "c"]);
        assert_eq!(
            dict.insert("c", Value::Null).unwrap_err().kind,
            ErrorKind::DuplicateKey
        );
    }

    #[rstest::rstest]
    fn test_entry_inserts_null_once() {
        let region = Region::new();
        let mut dict = Dict::new_in(&region);
        assert!(dict.entry("k").unwrap().is_null());
        *dict.entry("k").unwrap() = Value::Bool(true);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("k").and_then(Value::as_bool), Some(true));
    }

    #[rstest::rstest]
    fn test_remove_and_lookup() {
        let region = Region::new();
        let mut dict = Dict::new_in(&region);
        dict.insert("a", Value::Null).unwrap();
        dict.insert("b", Value::Bool(false)).unwrap();
        assert!(dict.contains_key("b"));
        assert_eq!(dict.remove("b"), Some(Value::Bool(false)));
        assert!(!dict.contains_key("b"));
        assert_eq!(dict.remove("missing"), None);
        assert!(dict.get_mut("a").is_some());
    }

    #[rstest::rstest]
    fn test_try_clone_is_deep() {
        let region = Region::new();
        let mut inner = Dict::new_in(&region);
        inner.insert("x", Value::Number(1.0)).unwrap();
        let mut outer = Dict::new_in(&region);
        outer.insert("inner", Value::Dict(inner)).unwrap();

        let mut copy = outer.try_clone().unwrap();
        assert_eq!(copy, outer);
        if let Some(Value::Dict(inner)) = copy.get_mut("inner") {
            *inner.entry("x").unwrap() = Value::Number(2.0);
        }
        assert_ne!(copy, outer);
        assert_eq!(
            outer.get("inner").and_then(|v| v.get("x")).and_then(Value::as_f64),
            Some(1.0)
        );
    }
}
