//! Declarative styles and the state overrides layered on top of them.
//!
//! Before a state bundle first overrides a property, the value the property
//! was heading to is recorded in the node's undo map. When no active state
//! styles the property any more, that value is written back.

use smol_str::SmolStr;

use super::dispatch::Origin;
use super::{NodeId, Scene};
use crate::error::SceneResult;
use crate::style::{PropKey, PropValue, Style};

impl Scene {
    /// Applies `style` to every property `node` has not set explicitly.
    ///
    /// With `Config::lock_styles`, a rendered node keeps its first style.
    pub fn set_style(&mut self, node: NodeId, style: Style) -> SceneResult<()> {
        let el = self.get_node(node)?;
        if self.config.lock_styles && el.is_rendered() && el.style.is_some() {
            tracing::warn!("style of {:?} is locked after render; ignoring new style", node);
            return Ok(());
        }
        let writes: Vec<(PropKey, PropValue)> = style
            .entries()
            .filter(|(key, _)| !el.explicit.contains(key))
            .map(|(key, value)| (key, value.clone()))
            .collect();
        let has_states = !el.states.is_empty();

        for (key, value) in writes {
            if let Err(err) = self.write_prop(node, key, value, Origin::Style) {
                tracing::warn!("style entry {:?} on {:?} ignored: {}", key, node, err);
            }
        }
        self.get_node_mut(node)?.style = Some(style);
        if has_states {
            self.state_changed(node);
        }
        Ok(())
    }

    /// Re-applies state bundles after the active states of `node` changed.
    pub(crate) fn state_changed(&mut self, node: NodeId) {
        let Some(el) = self.nodes.get(node) else {
            return;
        };
        let tags: Vec<SmolStr> = el.states.as_slice().to_vec();
        if self.prop_bool(node, PropKey::ForwardStates) == Some(true) {
            for child in el.children.clone() {
                let changed = self
                    .nodes
                    .get_mut(child)
                    .is_some_and(|child_el| child_el.states.replace(&tags));
                if changed {
                    self.state_changed(child);
                }
            }
        }

        let Some(style) = self.nodes.get(node).and_then(|el| el.style.clone()) else {
            return;
        };
        let mut merged = Style::new();
        for tag in &tags {
            if let Some(bundle) = style.state_style(tag) {
                merged.merge_from(bundle);
            }
        }

        let mut stale: Vec<(PropKey, Option<PropValue>)> = Vec::new();
        if let Some(el) = self.nodes.get_mut(node) {
            let keys: Vec<PropKey> = el
                .undo
                .keys()
                .copied()
                .filter(|key| !merged.contains(*key))
                .collect();
            for key in keys {
                if let Some(prev) = el.undo.remove(&key) {
                    stale.push((key, prev));
                }
            }
        }
        // transition goes last so the restored values still animate
        stale.sort_by_key(|(key, _)| *key == PropKey::Transition);
        for (key, prev) in stale {
            if let Err(err) = self.restore_prop(node, key, prev, Origin::State) {
                tracing::warn!("restoring {:?} on {:?} failed: {}", key, node, err);
            }
        }

        let transition = merged.get(PropKey::Transition).cloned();
        let ordered = transition
            .map(|value| (PropKey::Transition, value))
            .into_iter()
            .chain(
                merged
                    .entries()
                    .filter(|(key, _)| *key != PropKey::Transition)
                    .map(|(key, value)| (key, value.clone())),
            );
        for (key, value) in ordered.collect::<Vec<_>>() {
            let recorded = self
                .nodes
                .get(node)
                .is_some_and(|el| el.undo.contains_key(&key));
            if !recorded {
                let prev = self.settled_value(node, key);
                if let Some(el) = self.nodes.get_mut(node) {
                    el.undo.insert(key, prev);
                }
            }
            if let Err(err) = self.write_prop(node, key, value, Origin::State) {
                tracing::warn!("state style {:?} on {:?} ignored: {}", key, node, err);
            }
        }
    }
}
