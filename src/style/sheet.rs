use indexmap::IndexMap;
use smol_str::SmolStr;

use super::{PropKey, PropValue};

/// Ordered property bag with optional per-state override bundles.
///
/// Base entries populate only properties the node has not set explicitly.
/// State bundles are layered in the node's active-state order whenever its
/// [`States`](crate::States) change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    entries: IndexMap<PropKey, PropValue>,
    states: IndexMap<SmolStr, Style>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<PropKey>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<PropKey>, value: impl Into<PropValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn state(mut self, name: impl Into<SmolStr>, style: Style) -> Self {
        self.states.insert(name.into(), style);
        self
    }

    pub fn get(&self, key: PropKey) -> Option<&PropValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: PropKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (PropKey, &PropValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn state_styles(&self) -> impl Iterator<Item = (&SmolStr, &Style)> {
        self.states.iter()
    }

    pub fn state_style(&self, name: &str) -> Option<&Style> {
        self.states.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Layers `other` on top: its entries win, first-seen key order is kept.
    pub fn merge_from(&mut self, other: &Style) {
        for (key, value) in other.entries() {
            self.entries.insert(key, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn merge_overrides_values_but_keeps_first_order() {
        let mut merged = Style::new()
            .set(PropKey::WIDTH, 10.0)
            .set(PropKey::COLOR, Color::WHITE);
        merged.merge_from(&Style::new().set(PropKey::Gap, 4.0).set(PropKey::WIDTH, 20.0));

        let keys: Vec<_> = merged.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![PropKey::WIDTH, PropKey::COLOR, PropKey::Gap]);
        assert_eq!(merged.get(PropKey::WIDTH), Some(&PropValue::Number(20.0)));
    }

    #[test]
    fn state_bundles_are_looked_up_by_name() {
        let style = Style::new().state("focus", Style::new().set(PropKey::ALPHA, 1.0));
        assert!(style.state_style("focus").is_some());
        assert!(style.state_style("selected").is_none());
    }
}
