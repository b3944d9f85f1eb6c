//! `array(*)` (spec.md §3.1, §5): a persistent, 1-based-indexed sequence of
//! members, each itself an `XdmValue` (so an array member can hold a whole
//! sequence, unlike a plain XDM sequence item).

use super::sequence::XdmValue;
use crate::error::{self, XPathError};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq)]
pub struct XdmArray<N> {
    members: Vec<XdmValue<N>>,
}

impl<N: Clone> Default for XdmArray<N> {
    fn default() -> Self {
        Self { members: Vec::new() }
    }
}

impl<N: Clone> XdmArray<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: Vec<XdmValue<N>>) -> Self {
        Self { members }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[XdmValue<N>] {
        &self.members
    }

    fn check_index(&self, index: i64) -> Result<usize, XPathError> {
        if index < 1 || index as usize > self.members.len() {
            return Err(error::function_error(
                "array",
                format!("index {} out of bounds for array of size {}", index, self.members.len()),
            ));
        }
        Ok((index - 1) as usize)
    }

    /// `array:get($array, $position)`, 1-based.
    pub fn get(&self, index: i64) -> Result<&XdmValue<N>, XPathError> {
        Ok(&self.members[self.check_index(index)?])
    }

    /// `array:put`: returns a new array with member `index` replaced.
    pub fn put(&self, index: i64, value: XdmValue<N>) -> Result<Self, XPathError> {
        let idx = self.check_index(index)?;
        let mut members = self.members.clone();
        members[idx] = value;
        Ok(Self { members })
    }

    pub fn append(&self, value: XdmValue<N>) -> Self {
        let mut members = self.members.clone();
        members.push(value);
        Self { members }
    }

    /// `array:insert-before($array, $position, $member)`: `$position` may
    /// be one past the end (equivalent to append).
    pub fn insert_before(&self, index: i64, value: XdmValue<N>) -> Result<Self, XPathError> {
        if index < 1 || index as usize > self.members.len() + 1 {
            return Err(error::function_error(
                "array",
                format!("insertion position {} out of bounds", index),
            ));
        }
        let mut members = self.members.clone();
        members.insert((index - 1) as usize, value);
        Ok(Self { members })
    }

    pub fn remove(&self, index: i64) -> Result<Self, XPathError> {
        let idx = self.check_index(index)?;
        let mut members = self.members.clone();
        members.remove(idx);
        Ok(Self { members })
    }

    /// `array:subarray($array, $start, $length?)`, 1-based, inclusive.
    pub fn subarray(&self, start: i64, length: Option<i64>) -> Result<Self, XPathError> {
        let len = length.unwrap_or(self.members.len() as i64 - start + 1);
        if start < 1 || len < 0 || (start - 1 + len) as usize > self.members.len() {
            return Err(error::function_error("array", "subarray range out of bounds"));
        }
        let start_idx = (start - 1) as usize;
        Ok(Self { members: self.members[start_idx..start_idx + len as usize].to_vec() })
    }

    pub fn head(&self) -> Result<&XdmValue<N>, XPathError> {
        self.members.first().ok_or_else(|| error::function_error("array", "head of empty array"))
    }

    pub fn tail(&self) -> Result<Self, XPathError> {
        if self.members.is_empty() {
            return Err(error::function_error("array", "tail of empty array"));
        }
        Ok(Self { members: self.members[1..].to_vec() })
    }

    pub fn reverse(&self) -> Self {
        let mut members = self.members.clone();
        members.reverse();
        Self { members }
    }

    pub fn join(arrays: impl IntoIterator<Item = XdmArray<N>>) -> Self {
        let mut members = Vec::new();
        for a in arrays {
            members.extend(a.members);
        }
        Self { members }
    }
}

impl<N: Eq> Eq for XdmArray<N> {}

impl<N: Hash> Hash for XdmArray<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.len().hash(state);
        for m in &self.members {
            m.items().len().hash(state);
        }
    }
}

impl<N: Clone + fmt::Display> fmt::Display for XdmArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array[{} members]", self.members.len())
    }
}
