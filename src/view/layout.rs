use super::dispatch::Origin;
use super::{NodeId, NodeKind, Scene};
use crate::layout::{FlexContainer, FlexItem, flex, trace_layout_enabled};
use crate::style::{Direction, Edges, FlexBoundary, FlexDirection, NumProp, PropKey, PropValue};

#[derive(Clone, Copy, Debug, Default)]
struct FlexPass {
    resized: bool,
    grew: bool,
}

impl Scene {
    /// Lays out the children of `node` right away.
    ///
    /// When the node's own size changes, or its `on_layout` hook asks for it,
    /// the parent is enqueued for the next drain.
    pub fn update_layout(&mut self, node: NodeId) {
        let Some(el) = self.nodes.get(node) else {
            return;
        };
        if el.children.is_empty() {
            return;
        }
        let on_layout = el.handlers.on_layout.clone();
        let parent = el.parent;

        let mut pass = FlexPass::default();
        if self.is_flex(node) {
            let grow = self.prop_number(node, PropKey::FlexGrow).unwrap_or(0.0);
            if grow > 0.0 && self.layout_number(node, NumProp::Width) == 0.0 {
                tracing::trace!("{:?} waits for its parent to size it", node);
                return;
            }
            pass = self.flex_layout(node);
        }
        let mut changed = pass.resized;
        if let Some(hook) = on_layout {
            changed |= hook(self, node);
        }
        if changed {
            if let Some(parent) = parent {
                self.enqueue_layout(parent);
            }
        }
        if pass.grew {
            let growing: Vec<NodeId> = self
                .children(node)
                .iter()
                .copied()
                .filter(|child| {
                    self.is_flex(*child)
                        && self.prop_number(*child, PropKey::FlexGrow).unwrap_or(0.0) > 0.0
                })
                .collect();
            for child in growing {
                self.update_layout(child);
            }
        }
    }

    /// Writes a layout-computed number when it differs from where the
    /// property is heading. Returns whether anything was written.
    pub(crate) fn write_layout(&mut self, node: NodeId, prop: NumProp, value: f32) -> bool {
        if self.layout_number(node, prop) == value {
            return false;
        }
        match self.write_prop(node, PropKey::Num(prop), PropValue::Number(value), Origin::Layout) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("layout write {:?} on {:?} failed: {}", prop, node, err);
                false
            }
        }
    }

    fn flex_layout(&mut self, node: NodeId) -> FlexPass {
        let container = self.flex_container(node);
        let is_row = container.direction == FlexDirection::Row;

        let mut participants = Vec::new();
        let mut items = Vec::new();
        for &child in self.children(node) {
            let Some(child_el) = self.nodes.get(child) else {
                continue;
            };
            if child_el.kind == NodeKind::TextLeaf
                || self.prop_bool(child, PropKey::FlexItem) == Some(false)
            {
                continue;
            }
            let (width, height) = self.layout_size(child);
            if child_el.kind == NodeKind::TextContainer
                && width == 0.0
                && height == 0.0
                && !self.compose_text(child).is_empty()
            {
                tracing::debug!("{:?} waits for the text size of {:?}", node, child);
                return FlexPass::default();
            }
            participants.push(child);
            items.push(self.flex_item(child, width, height, is_row));
        }

        let Some(outcome) = flex::compute(&container, &items) else {
            return FlexPass::default();
        };
        if outcome.grow_starved {
            tracing::warn!(
                "flex grow on {:?} has no room: children already fill the container",
                node
            );
        }
        if trace_layout_enabled() {
            tracing::trace!(
                "flex {:?}: {}x{} -> {}x{}, {} item(s), grew={}",
                node,
                container.width,
                container.height,
                outcome.width,
                outcome.height,
                items.len(),
                outcome.grew
            );
        }

        for (child, placed) in participants.iter().copied().zip(&outcome.items) {
            if let Some(x) = placed.x {
                self.write_layout(child, NumProp::X, x);
            }
            if let Some(y) = placed.y {
                self.write_layout(child, NumProp::Y, y);
            }
            let mut resized = self.write_layout(child, NumProp::Width, placed.width);
            resized |= self.write_layout(child, NumProp::Height, placed.height);
            if let (Some(base), Some(child_el)) = (placed.grown_from, self.nodes.get_mut(child)) {
                let slot = if is_row {
                    &mut child_el.pre_flex_width
                } else {
                    &mut child_el.pre_flex_height
                };
                slot.get_or_insert(base);
            }
            if resized
                && placed.grown_from.is_none()
                && self.is_flex(child)
                && !self.children(child).is_empty()
            {
                self.enqueue_layout(child);
            }
        }

        self.write_layout(node, NumProp::Width, outcome.width);
        self.write_layout(node, NumProp::Height, outcome.height);
        if let Some(el) = self.nodes.get_mut(node) {
            if let Some(from) = outcome.resized_from {
                let slot = if is_row {
                    &mut el.pre_flex_width
                } else {
                    &mut el.pre_flex_height
                };
                slot.get_or_insert(from);
            }
            if outcome.grew {
                el.contains_flex_grow = Some(self.scheduler.pass());
            }
        }
        FlexPass {
            resized: outcome.size_changed,
            grew: outcome.grew,
        }
    }

    fn flex_container(&self, node: NodeId) -> FlexContainer {
        let (width, height) = self.layout_size(node);
        let el = self.nodes.get(node);
        let boundary = |key| match self.prop(node, key) {
            Some(PropValue::Boundary(boundary)) => *boundary,
            _ => FlexBoundary::default(),
        };
        FlexContainer {
            direction: match self.prop(node, PropKey::FlexDirection) {
                Some(PropValue::FlexDirection(direction)) => *direction,
                _ => FlexDirection::default(),
            },
            wrap: match self.prop(node, PropKey::FlexWrap) {
                Some(PropValue::FlexWrap(wrap)) => *wrap,
                _ => Default::default(),
            },
            justify: match self.prop(node, PropKey::JustifyContent) {
                Some(PropValue::Justify(justify)) => *justify,
                _ => Default::default(),
            },
            align_items: match self.prop(node, PropKey::AlignItems) {
                Some(PropValue::Align(align)) => Some(*align),
                _ => None,
            },
            text_direction: match self.prop(node, PropKey::Direction) {
                Some(PropValue::Direction(direction)) => *direction,
                _ => Direction::default(),
            },
            width,
            height,
            min_width: self.prop_number(node, PropKey::MinWidth),
            min_height: self.prop_number(node, PropKey::MinHeight),
            padding: self.edges(node, PropKey::Padding),
            gap: self.prop_number(node, PropKey::Gap).unwrap_or(0.0),
            row_gap: self.prop_number(node, PropKey::RowGap),
            column_gap: self.prop_number(node, PropKey::ColumnGap),
            boundary: boundary(PropKey::FlexBoundary),
            cross_boundary: boundary(PropKey::FlexCrossBoundary),
            calc_height: el.is_some_and(|el| el.calc_height),
            grow_latched: el.and_then(|el| el.contains_flex_grow) == Some(self.scheduler.pass()),
        }
    }

    fn flex_item(&self, child: NodeId, width: f32, height: f32, is_row: bool) -> FlexItem {
        let mut margin = self.edges(child, PropKey::Margin);
        let sides = [
            (PropKey::MarginTop, &mut margin.top),
            (PropKey::MarginRight, &mut margin.right),
            (PropKey::MarginBottom, &mut margin.bottom),
            (PropKey::MarginLeft, &mut margin.left),
        ];
        for (key, side) in sides {
            if let Some(value) = self.prop_number(child, key) {
                *side = value;
            }
        }
        let el = self.nodes.get(child);
        FlexItem {
            width,
            height,
            min_width: self.prop_number(child, PropKey::MinWidth),
            min_height: self.prop_number(child, PropKey::MinHeight),
            margin,
            flex_grow: self.prop_number(child, PropKey::FlexGrow).unwrap_or(0.0),
            flex_order: match self.prop(child, PropKey::FlexOrder) {
                Some(PropValue::Int(order)) => Some(*order),
                _ => None,
            },
            align_self: match self.prop(child, PropKey::AlignSelf) {
                Some(PropValue::Align(align)) => Some(*align),
                _ => None,
            },
            pre_flex_main: el.and_then(|el| {
                if is_row {
                    el.pre_flex_width
                } else {
                    el.pre_flex_height
                }
            }),
        }
    }

    fn edges(&self, node: NodeId, key: PropKey) -> Edges {
        match self.prop(node, key) {
            Some(PropValue::Edges(edges)) => *edges,
            _ => Edges::ZERO,
        }
    }
}
