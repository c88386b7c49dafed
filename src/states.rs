//! Active state tags of an element.
//!
//! Every mutator reports whether membership actually changed; the scene
//! re-applies state styles only on `true`.

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct States {
    tags: Vec<SmolStr>,
}

impl States {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let mut states = Self::new();
        states.merge(tags);
        states
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True when `tag` is the only active state.
    pub fn is(&self, tag: &str) -> bool {
        self.tags.len() == 1 && self.tags[0] == tag
    }

    pub fn add(&mut self, tag: impl Into<SmolStr>) -> bool {
        let tag = tag.into();
        if self.has(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn toggle(&mut self, tag: impl Into<SmolStr>) -> bool {
        let tag = tag.into();
        if !self.remove(&tag) {
            self.tags.push(tag);
        }
        true
    }

    /// Forces a tag on or off.
    pub fn set(&mut self, tag: impl Into<SmolStr>, active: bool) -> bool {
        let tag = tag.into();
        if active { self.add(tag) } else { self.remove(&tag) }
    }

    /// Adds every missing tag, keeping the existing order.
    pub fn merge<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let mut changed = false;
        for tag in tags {
            changed |= self.add(tag);
        }
        changed
    }

    /// Replaces the whole set; reports a change only if the sequence differs.
    pub fn replace(&mut self, tags: &[SmolStr]) -> bool {
        let mut next = Vec::with_capacity(tags.len());
        for tag in tags {
            if !next.contains(tag) {
                next.push(tag.clone());
            }
        }
        if next == self.tags {
            return false;
        }
        self.tags = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.tags.is_empty();
        self.tags.clear();
        changed
    }

    pub fn as_slice(&self) -> &[SmolStr] {
        &self.tags
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::States;

    #[test]
    fn add_and_remove_report_membership_changes_only() {
        let mut states = States::new();
        assert!(states.add("focus"));
        assert!(!states.add("focus"));
        assert!(states.remove("focus"));
        assert!(!states.remove("focus"));
    }

    #[test]
    fn merge_keeps_insertion_order_without_duplicates() {
        let mut states = States::from_tags(["focus"]);
        assert!(states.merge(["selected", "focus", "disabled"]));
        assert_eq!(states.iter().collect::<Vec<_>>(), ["focus", "selected", "disabled"]);
        assert!(!states.merge(["selected"]));
    }

    #[test]
    fn toggle_and_set_flip_tags() {
        let mut states = States::new();
        assert!(states.toggle("active"));
        assert!(states.has("active"));
        assert!(states.is("active"));
        assert!(states.toggle("active"));
        assert!(!states.has("active"));
        assert!(!states.set("active", false));
        assert!(states.set("active", true));
    }

    #[test]
    fn replace_detects_identical_sequences() {
        let mut states = States::from_tags(["a", "b"]);
        assert!(!states.replace(&["a".into(), "b".into()]));
        assert!(states.replace(&["b".into(), "a".into()]));
        assert_eq!(states.as_slice(), ["b", "a"]);
    }
}
