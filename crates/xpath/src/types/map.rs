//! `map(*)` (spec.md §3.1, §5): a persistent, insertion-ordered association
//! from atomic keys to `XdmValue`s. Every mutator returns a new map; the
//! receiver is untouched, matching XDM's "maps are immutable" rule.

use super::atomic::AtomicValue;
use super::sequence::XdmValue;
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct XdmMap<N> {
    entries: IndexMap<AtomicValue, XdmValue<N>>,
}

impl<N: Clone> Default for XdmMap<N> {
    fn default() -> Self {
        Self { entries: IndexMap::new() }
    }
}

impl<N: Clone> XdmMap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: IndexMap<AtomicValue, XdmValue<N>>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &AtomicValue) -> Option<&XdmValue<N>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &AtomicValue) -> bool {
        self.entries.contains_key(key)
    }

    /// `map:put`: returns a new map with `key` bound to `value`.
    pub fn put(&self, key: AtomicValue, value: XdmValue<N>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key, value);
        Self { entries }
    }

    /// `map:remove`: returns a new map without `key` (a no-op if absent).
    pub fn remove(&self, key: &AtomicValue) -> Self {
        let mut entries = self.entries.clone();
        entries.shift_remove(key);
        Self { entries }
    }

    /// `map:merge`: later maps in `maps` overwrite earlier ones' keys
    /// (the default `use-first` duplicates option is *not* the default
    /// here; callers needing it should filter before merging).
    pub fn merge(maps: impl IntoIterator<Item = XdmMap<N>>) -> Self {
        let mut entries = IndexMap::new();
        for m in maps {
            for (k, v) in m.entries {
                entries.insert(k, v);
            }
        }
        Self { entries }
    }

    pub fn keys(&self) -> impl Iterator<Item = &AtomicValue> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &XdmValue<N>> {
        self.entries.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&AtomicValue, &XdmValue<N>)> {
        self.entries.iter()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_items(self) -> IndexMap<AtomicValue, XdmValue<N>> {
        self.entries
    }
}

impl<N: PartialEq> PartialEq for XdmMap<N> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(k, v)| other.entries.get(k) == Some(v))
    }
}
impl<N: Eq> Eq for XdmMap<N> {}

impl<N: Hash> Hash for XdmMap<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for (k, v) in &self.entries {
            k.hash(state);
            v.items().len().hash(state);
        }
    }
}

impl<N: Clone + fmt::Display> fmt::Display for XdmMap<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map{{")?;
        for (i, (k, _v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: ...", k)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_does_not_mutate_original() {
        let m: XdmMap<()> = XdmMap::new();
        let m2 = m.put(AtomicValue::Integer(1), XdmValue::from_atomic(AtomicValue::String("a".into())));
        assert_eq!(m.size(), 0);
        assert_eq!(m2.size(), 1);
    }

    #[test]
    fn remove_is_a_no_op_for_missing_key() {
        let m: XdmMap<()> = XdmMap::new().put(AtomicValue::Integer(1), XdmValue::empty());
        let m2 = m.remove(&AtomicValue::Integer(99));
        assert_eq!(m2.size(), 1);
    }

    #[test]
    fn merge_lets_later_maps_win() {
        let a: XdmMap<()> = XdmMap::new().put(AtomicValue::Integer(1), XdmValue::from_atomic(AtomicValue::String("a".into())));
        let b: XdmMap<()> = XdmMap::new().put(AtomicValue::Integer(1), XdmValue::from_atomic(AtomicValue::String("b".into())));
        let merged = XdmMap::merge(vec![a, b]);
        assert_eq!(
            merged.get(&AtomicValue::Integer(1)),
            Some(&XdmValue::from_atomic(AtomicValue::String("b".into())))
        );
    }
}
