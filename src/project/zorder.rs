//! Layering order of sprites.
//!
//! The first name is drawn at the bottom, the last on top. The owning project
//! keeps the list an exact permutation of its sprite names.

use std::collections::HashSet;

use crate::error::{ProjectError, Result};

/// Ordered sequence of sprite names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zorder(Vec<String>);

/// Where a sprite should land when it is moved in the zorder.
pub enum ZorderIndex {
    /// A literal position.
    At(usize),
    /// Computed from `(current_index, current_len)` before the sprite is taken out.
    Computed(Box<dyn FnOnce(usize, usize) -> usize + Send>),
}

impl ZorderIndex {
    pub fn computed(f: impl FnOnce(usize, usize) -> usize + Send + 'static) -> Self {
        ZorderIndex::Computed(Box::new(f))
    }

    /// One layer up, stopping at the top.
    pub fn up() -> Self {
        Self::computed(|idx, len| (idx + 1).min(len - 1))
    }

    /// One layer down, stopping at the bottom.
    pub fn down() -> Self {
        Self::computed(|idx, _| idx.saturating_sub(1))
    }

    /// `len - 1` of the sequence before removal.
    pub fn top() -> Self {
        Self::computed(|_, len| len - 1)
    }

    pub fn bottom() -> Self {
        ZorderIndex::At(0)
    }

    fn resolve(self, current: usize, len: usize) -> usize {
        match self {
            ZorderIndex::At(idx) => idx,
            ZorderIndex::Computed(f) => f(current, len),
        }
    }
}

impl From<usize> for ZorderIndex {
    fn from(idx: usize) -> Self {
        ZorderIndex::At(idx)
    }
}

impl Zorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_names(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }

    pub(crate) fn push_if_absent(&mut self, name: &str) {
        if self.position(name).is_none() {
            self.0.push(name.to_string());
        }
    }

    /// Replace `old` with `new` in place.
    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        if let Some(idx) = self.position(old) {
            self.0[idx] = new.to_string();
        }
    }

    /// Remove one occurrence of `name`.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Take `name` out and insert it again at `target`, which is resolved
    /// against the position and length before removal. Indices past the end
    /// of the shortened sequence insert at the end. Returns the new index.
    pub(crate) fn move_to(&mut self, name: &str, target: ZorderIndex) -> Result<usize> {
        let current = self
            .position(name)
            .ok_or_else(|| ProjectError::ZorderEntryNotFound {
                name: name.to_string(),
            })?;
        let idx = target.resolve(current, self.0.len());
        let entry = self.0.remove(current);
        let idx = idx.min(self.0.len());
        self.0.insert(idx, entry);
        Ok(idx)
    }

    /// Keep only names in `live` (first occurrence wins).
    pub(crate) fn retain_live<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) {
        let live: HashSet<&str> = live.into_iter().collect();
        let mut seen = HashSet::new();
        self.0
            .retain(|name| live.contains(name.as_str()) && seen.insert(name.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn abc() -> Zorder {
        Zorder::from_names(vec!["a".into(), "b".into(), "c".into()])
    }

    fn names(z: &Zorder) -> Vec<&str> {
        z.iter().collect()
    }

    #[test_case("a", ZorderIndex::up(), &["b", "a", "c"] ; "up from bottom")]
    #[test_case("c", ZorderIndex::up(), &["a", "b", "c"] ; "up at top stays")]
    #[test_case("c", ZorderIndex::down(), &["a", "c", "b"] ; "down from top")]
    #[test_case("a", ZorderIndex::down(), &["a", "b", "c"] ; "down at bottom stays")]
    #[test_case("a", ZorderIndex::top(), &["b", "c", "a"] ; "top from bottom")]
    #[test_case("b", ZorderIndex::top(), &["a", "c", "b"] ; "top from middle")]
    #[test_case("c", ZorderIndex::bottom(), &["c", "a", "b"] ; "bottom from top")]
    #[test_case("a", ZorderIndex::At(1), &["b", "a", "c"] ; "literal index")]
    #[test_case("a", ZorderIndex::At(9), &["b", "c", "a"] ; "index past end clamps")]
    fn test_move_to(name: &str, target: ZorderIndex, expected: &[&str]) {
        let mut z = abc();
        z.move_to(name, target).unwrap();
        assert_eq!(names(&z), expected);
    }

    #[test]
    fn test_top_with_two_entries() {
        let mut z = Zorder::from_names(vec!["a".into(), "b".into()]);
        assert_eq!(z.move_to("a", ZorderIndex::top()).unwrap(), 1);
        assert_eq!(names(&z), vec!["b", "a"]);
    }

    #[test]
    fn test_move_single_entry() {
        let mut z = Zorder::from_names(vec!["a".into()]);
        for target in [ZorderIndex::up(), ZorderIndex::down(), ZorderIndex::top()] {
            assert_eq!(z.move_to("a", target).unwrap(), 0);
        }
        assert_eq!(names(&z), vec!["a"]);
    }

    #[test]
    fn test_move_unknown_name_fails() {
        let mut z = abc();
        let err = z.move_to("zz", ZorderIndex::up()).unwrap_err();
        assert_eq!(err.error_code(), "ZORDER_ENTRY_NOT_FOUND");
        assert_eq!(z, abc());
    }

    #[test]
    fn test_computed_index_sees_pre_removal_state() {
        let mut z = abc();
        z.move_to(
            "b",
            ZorderIndex::computed(|idx, len| {
                assert_eq!((idx, len), (1, 3));
                0
            }),
        )
        .unwrap();
        assert_eq!(names(&z), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut z = abc();
        z.rename("b", "bee");
        assert_eq!(names(&z), vec!["a", "bee", "c"]);
    }

    #[test]
    fn test_retain_live_drops_foreign_and_duplicates() {
        let mut z = Zorder::from_names(vec!["a".into(), "x".into(), "b".into(), "a".into()]);
        z.retain_live(["a", "b"]);
        assert_eq!(names(&z), vec!["a", "b"]);
    }
}
