use super::dispatch::Origin;
use super::scene::Microtask;
use super::{NodeId, NodeKind, Scene};
use crate::error::SceneResult;
use crate::renderer::{NodeEventKind, NodeProps};
use crate::style::{NumProp, PropKey, PropValue};

impl Scene {
    /// Creates the renderer handle of `node` and of every unrendered
    /// descendant. Returns `Ok(false)` without doing anything when the node
    /// is already rendered, is a text leaf, or its parent is not rendered.
    ///
    /// Handle creation failures propagate; the subtree below the failing node
    /// stays unrendered.
    pub fn render(&mut self, node: NodeId) -> SceneResult<bool> {
        self.render_node(node, true)
    }

    fn render_node(&mut self, node: NodeId, top_level: bool) -> SceneResult<bool> {
        let el = self.get_node(node)?;
        if el.is_rendered() || el.kind == NodeKind::TextLeaf {
            return Ok(false);
        }
        let kind = el.kind;
        let parent = el.parent;
        let Some((parent, parent_handle)) = parent.and_then(|parent| {
            self.nodes
                .get(parent)
                .and_then(|parent_el| parent_el.handle)
                .map(|handle| (parent, handle))
        }) else {
            tracing::warn!("cannot render {:?}: parent is missing or not rendered", node);
            return Ok(false);
        };

        self.resolve_anchors(node, parent)?;
        let text = match kind {
            NodeKind::Element => {
                self.default_size(node, parent)?;
                None
            }
            NodeKind::TextContainer => Some(self.prepare_text(node, parent)?),
            NodeKind::TextLeaf => None,
        };
        let texture = self.resolve_texture(node)?;
        let shader = self.resolve_shader(node)?;
        let clipping = self.prop_bool(node, PropKey::Clipping).unwrap_or(false);

        let el = self.get_node(node)?;
        let mut numbers = Vec::new();
        let mut colors = Vec::new();
        for (key, value) in &el.props {
            match (key, value) {
                (PropKey::Num(prop), PropValue::Number(v)) => numbers.push((*prop, *v)),
                (PropKey::Color(prop), PropValue::Color(c)) => colors.push((*prop, *c)),
                _ => {}
            }
        }
        numbers.sort_by_key(|(prop, _)| *prop as u8);
        colors.sort_by_key(|(prop, _)| *prop as u8);
        let props = NodeProps {
            parent: Some(parent_handle),
            numbers,
            colors,
            clipping,
            texture,
            shader,
            text,
        };
        let handle = match kind {
            NodeKind::TextContainer => self.renderer.create_text_node(&props)?,
            _ => self.renderer.create_node(&props)?,
        };
        self.handles.insert(handle, node);

        // the handle owns numbers and colors from here on
        let el = self.get_node_mut(node)?;
        el.props
            .retain(|key, _| !matches!(key, PropKey::Num(_) | PropKey::Color(_)));
        el.handle = Some(handle);
        let children = el.children.clone();
        let reparent = std::mem::take(&mut el.has_rendered_children);
        let mut subscriptions: Vec<NodeEventKind> = Vec::new();
        let wanted = el.handlers.on_event.iter().map(|(kind, _)| *kind);
        let loaded = (kind == NodeKind::TextContainer).then_some(NodeEventKind::Loaded);
        for event_kind in wanted.chain(loaded) {
            if !subscriptions.contains(&event_kind) {
                subscriptions.push(event_kind);
            }
        }
        let on_create = el.handlers.on_create.clone();
        let on_render = el.handlers.on_render.clone();
        let lays_out = el.has_layout_hook();

        if reparent {
            for child in &children {
                if let Some(child_handle) = self.nodes.get(*child).and_then(|c| c.handle) {
                    self.renderer.set_parent(child_handle, Some(handle))?;
                }
            }
        }
        tracing::trace!("rendered {:?} as {:?}", node, handle);

        if let Some(handler) = on_create {
            handler(self, node);
        }
        if let Some(handler) = on_render {
            handler(self, node);
        }
        for kind in subscriptions {
            self.renderer.subscribe(handle, kind)?;
        }

        if !children.is_empty() && (lays_out || self.is_flex(node)) {
            self.enqueue_layout(node);
        }
        for child in children {
            if self.contains(child) {
                self.render_node(child, false)?;
            }
        }
        if top_level {
            self.microtasks.push_back(Microtask::DeferredLayout(node));
        }
        if self.prop_bool(node, PropKey::Autofocus) == Some(true) {
            self.set_active_element(Some(node));
        }
        Ok(true)
    }

    /// Turns `right`/`bottom`/`center*` into positions and mount points.
    fn resolve_anchors(&mut self, node: NodeId, parent: NodeId) -> SceneResult<()> {
        let (parent_width, parent_height) = self.layout_size(parent);
        let center = self.prop_bool(node, PropKey::Center) == Some(true);
        let mut anchors = Vec::new();
        if let Some(right) = self.prop_number(node, PropKey::Right) {
            anchors.push((NumProp::X, parent_width - right));
            anchors.push((NumProp::MountX, 1.0));
        }
        if let Some(bottom) = self.prop_number(node, PropKey::Bottom) {
            anchors.push((NumProp::Y, parent_height - bottom));
            anchors.push((NumProp::MountY, 1.0));
        }
        if center || self.prop_bool(node, PropKey::CenterX) == Some(true) {
            anchors.push((NumProp::X, parent_width * 0.5));
            anchors.push((NumProp::MountX, 0.5));
        }
        if center || self.prop_bool(node, PropKey::CenterY) == Some(true) {
            anchors.push((NumProp::Y, parent_height * 0.5));
            anchors.push((NumProp::MountY, 0.5));
        }
        for (prop, value) in anchors {
            self.write_prop(node, PropKey::Num(prop), PropValue::Number(value), Origin::Layout)?;
        }
        Ok(())
    }

    /// Unsized elements fill the rest of their parent.
    fn default_size(&mut self, node: NodeId, parent: NodeId) -> SceneResult<()> {
        let (parent_width, parent_height) = self.layout_size(parent);
        if self.number(node, NumProp::Width) == 0.0 {
            let width = (parent_width - self.number(node, NumProp::X)).max(0.0);
            self.write_prop(node, PropKey::WIDTH, PropValue::Number(width), Origin::Layout)?;
            self.get_node_mut(node)?.calc_width = true;
        }
        if self.number(node, NumProp::Height) == 0.0 {
            let height = (parent_height - self.number(node, NumProp::Y)).max(0.0);
            self.write_prop(node, PropKey::HEIGHT, PropValue::Number(height), Origin::Layout)?;
            self.get_node_mut(node)?.calc_height = true;
        }
        Ok(())
    }
}
