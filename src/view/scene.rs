use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smol_str::SmolStr;

use super::{DestroyMode, ElementNode, NodeHandler, NodeId, NodeKind};
use crate::config::Config;
use crate::error::{SceneError, SceneResult};
use crate::layout::LayoutScheduler;
use crate::renderer::{HandleId, NodeEvent, Renderer, RendererEvent, ShaderId};
use crate::states::States;
use crate::style::{NumProp, PropKey, PropValue, ShaderProps};
use crate::transition::{AnimationEvent, AnimationId, SimpleAnimation};

pub(crate) const FOCUS_STATE: &str = "focus";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Microtask {
    LayoutDrain,
    /// Second layout pass after a top-level render, for late text sizes.
    DeferredLayout(NodeId),
}

/// Owns the node tree and every service node operations need: the renderer,
/// the layout scheduler, the tween runner and the microtask queue.
///
/// The host drives it with [`run_microtasks`](Self::run_microtasks) after
/// each batch of mutations and [`frame`](Self::frame) once per display frame.
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeId, ElementNode>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) root: NodeId,
    pub(crate) scheduler: LayoutScheduler<NodeId>,
    pub(crate) tweens: SimpleAnimation<NodeId>,
    pub(crate) microtasks: VecDeque<Microtask>,
    pub(crate) config: Config,
    pub(crate) handles: FxHashMap<HandleId, NodeId>,
    pub(crate) animations: FxHashMap<AnimationId, NodeId>,
    pub(crate) stop_callbacks: FxHashMap<AnimationId, Vec<NodeHandler>>,
    pub(crate) active_element: Option<NodeId>,
    /// Shaders already created, one per distinct effect combination.
    pub(crate) shader_cache: Vec<(ShaderProps, ShaderId)>,
}

impl Scene {
    /// Creates a scene whose rendered root covers `width` x `height`.
    pub fn new(
        renderer: impl Renderer,
        config: Config,
        width: f32,
        height: f32,
    ) -> SceneResult<Self> {
        let mut renderer: Box<dyn Renderer> = Box::new(renderer);
        let root_handle = renderer.create_root(width, height)?;
        let mut nodes = SlotMap::with_key();
        let mut root = ElementNode::new(NodeKind::Element);
        root.handle = Some(root_handle);
        root.explicit.insert(PropKey::WIDTH);
        root.explicit.insert(PropKey::HEIGHT);
        let root = nodes.insert(root);
        let mut handles = FxHashMap::default();
        handles.insert(root_handle, root);
        Ok(Self {
            nodes,
            renderer,
            root,
            scheduler: LayoutScheduler::new(),
            tweens: SimpleAnimation::new(),
            microtasks: VecDeque::new(),
            config,
            handles,
            animations: FxHashMap::default(),
            stop_callbacks: FxHashMap::default(),
            active_element: None,
            shader_cache: Vec::new(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    /// Downcasts the renderer to its concrete type.
    pub fn renderer_as<R: Renderer>(&self) -> Option<&R> {
        self.renderer.as_any().downcast_ref::<R>()
    }

    pub fn renderer_as_mut<R: Renderer>(&mut self) -> Option<&mut R> {
        self.renderer.as_any_mut().downcast_mut::<R>()
    }

    pub fn create_element(&mut self) -> NodeId {
        self.nodes.insert(ElementNode::new(NodeKind::Element))
    }

    pub fn create_text(&mut self) -> NodeId {
        self.nodes.insert(ElementNode::new(NodeKind::TextContainer))
    }

    pub fn create_text_leaf(&mut self, text: impl Into<SmolStr>) -> NodeId {
        let mut leaf = ElementNode::new(NodeKind::TextLeaf);
        leaf.props.insert(PropKey::Text, PropValue::Str(text.into()));
        self.nodes.insert(leaf)
    }

    pub fn node(&self, node: NodeId) -> Option<&ElementNode> {
        self.nodes.get(node)
    }

    /// Mutable access for handler registration.
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node_for_handle(&self, handle: HandleId) -> Option<NodeId> {
        self.handles.get(&handle).copied()
    }

    pub fn is_rendered(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(ElementNode::is_rendered)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map_or(&[], |el| el.children.as_slice())
    }

    pub(crate) fn get_node(&self, node: NodeId) -> SceneResult<&ElementNode> {
        self.nodes.get(node).ok_or(SceneError::UnknownNode(node))
    }

    pub(crate) fn get_node_mut(&mut self, node: NodeId) -> SceneResult<&mut ElementNode> {
        self.nodes.get_mut(node).ok_or(SceneError::UnknownNode(node))
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|el| el.parent);
        }
        false
    }

    /// Appends `child` to `parent`, or places it before `before` when that
    /// node is one of `parent`'s children. The child leaves its old parent
    /// first.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> SceneResult<()> {
        self.get_node(parent)?;
        let old_parent = self.get_node(child)?.parent;
        if self.is_ancestor(child, parent) {
            tracing::warn!("refusing to insert {:?} into its own subtree", child);
            return Ok(());
        }

        match old_parent {
            Some(old) if old != parent => {
                self.remove_child(old, child);
            }
            Some(old) => {
                if let Some(el) = self.nodes.get_mut(old) {
                    el.children.retain(|c| *c != child);
                }
            }
            None => {}
        }

        let parent_el = self.get_node_mut(parent)?;
        let index = before.and_then(|anchor| parent_el.children.iter().position(|c| *c == anchor));
        match index {
            Some(index) => parent_el.children.insert(index, child),
            None => parent_el.children.push(child),
        }
        let parent_handle = parent_el.handle;
        let parent_kind = parent_el.kind;

        let child_el = self.get_node_mut(child)?;
        child_el.parent = Some(parent);
        let child_handle = child_el.handle;
        let child_kind = child_el.kind;

        match (parent_handle, child_handle) {
            (Some(parent_handle), Some(child_handle)) => {
                self.renderer.set_parent(child_handle, Some(parent_handle))?;
            }
            (None, Some(_)) => {
                self.get_node_mut(parent)?.has_rendered_children = true;
            }
            _ => {}
        }

        if child_kind == NodeKind::TextLeaf && parent_kind == NodeKind::TextContainer {
            self.refresh_text(parent)?;
        }
        if parent_handle.is_some() && self.is_flex(parent) {
            self.enqueue_layout(parent);
        }
        Ok(())
    }

    /// Detaches `child`; returns whether it was a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_el) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(index) = parent_el.children.iter().position(|c| *c == child) else {
            return false;
        };
        parent_el.children.remove(index);
        let parent_kind = parent_el.kind;
        let layout_affected = parent_el.has_layout_hook();

        let mut child_kind = None;
        if let Some(child_el) = self.nodes.get_mut(child) {
            child_el.parent = None;
            child_kind = Some(child_el.kind);
        }

        if let Some(handler) = self
            .nodes
            .get(child)
            .and_then(|el| el.handlers.on_remove.clone())
        {
            handler(self, child);
        }
        if child_kind == Some(NodeKind::TextLeaf) && parent_kind == NodeKind::TextContainer {
            if let Err(err) = self.refresh_text(parent) {
                tracing::warn!("failed to refresh text of {:?}: {}", parent, err);
            }
        }
        if layout_affected || self.is_flex(parent) {
            self.enqueue_layout(parent);
        }
        true
    }

    pub(crate) fn enqueue_layout(&mut self, node: NodeId) {
        if self.scheduler.enqueue(node) {
            self.microtasks.push_back(Microtask::LayoutDrain);
        }
    }

    pub fn has_pending_microtasks(&self) -> bool {
        !self.microtasks.is_empty()
    }

    /// Drains queued microtasks, including ones queued while draining, up to
    /// `Config::max_microtask_rounds`. Returns how many ran.
    pub fn run_microtasks(&mut self) -> usize {
        let mut rounds = 0;
        while let Some(task) = self.microtasks.pop_front() {
            if rounds >= self.config.max_microtask_rounds {
                self.microtasks.push_front(task);
                tracing::warn!(
                    "microtask round limit ({}) reached; {} task(s) left for the next run",
                    self.config.max_microtask_rounds,
                    self.microtasks.len()
                );
                break;
            }
            rounds += 1;
            match task {
                Microtask::LayoutDrain => self.drain_layout(),
                Microtask::DeferredLayout(node) => {
                    if self.contains(node) {
                        self.enqueue_layout(node);
                    }
                }
            }
        }
        rounds
    }

    fn drain_layout(&mut self) {
        let batch = self.scheduler.drain();
        tracing::debug!(
            "layout pass {}: {} node(s)",
            self.scheduler.pass(),
            batch.len()
        );
        for node in batch {
            if self.contains(node) {
                self.update_layout(node);
            }
        }
    }

    /// Host animation-frame callback.
    pub fn frame(&mut self, dt_ms: f32) {
        self.run_microtasks();
        self.pump_events();
        if self.tweens.is_registered() {
            for sample in self.tweens.advance(dt_ms) {
                self.apply_tween_sample(sample);
            }
        }
        self.finalize_settled_destroys();
        self.run_microtasks();
    }

    /// True while the tween runner needs frames.
    pub fn wants_frame(&self) -> bool {
        self.tweens.is_registered()
    }

    /// Dispatches every event the renderer has queued.
    pub fn pump_events(&mut self) {
        for event in self.renderer.poll_events() {
            match event {
                RendererEvent::Node { handle, event } => self.handle_node_event(handle, event),
                RendererEvent::Animation { id, event } => self.handle_animation_event(id, event),
            }
        }
    }

    pub fn handle_node_event(&mut self, handle: HandleId, event: NodeEvent) {
        let Some(node) = self.node_for_handle(handle) else {
            tracing::debug!("event for unknown handle {:?}", handle);
            return;
        };
        match &event {
            NodeEvent::Loaded { width, height } => self.apply_loaded_size(node, *width, *height),
            NodeEvent::Failed(reason) => {
                tracing::warn!("renderer reported failure on {:?}: {}", node, reason);
            }
            NodeEvent::Bounds(_) => {}
        }
        let kind = event.kind();
        let handlers: Vec<_> = self
            .nodes
            .get(node)
            .map(|el| {
                el.handlers
                    .on_event
                    .iter()
                    .filter(|(wanted, _)| *wanted == kind)
                    .map(|(_, handler)| handler.clone())
                    .collect()
            })
            .unwrap_or_default();
        for handler in handlers {
            handler(self, node, &event);
        }
    }

    pub fn handle_animation_event(&mut self, id: AnimationId, event: AnimationEvent) {
        let Some(node) = self.animations.get(&id).copied() else {
            return;
        };
        if event == AnimationEvent::Stopped {
            self.animations.remove(&id);
            if let Some(el) = self.nodes.get_mut(node) {
                el.native_targets.retain(|_, (owner, _)| *owner != id);
            }
        }
        let handlers = self
            .nodes
            .get(node)
            .map(|el| el.handlers.on_animation.clone())
            .unwrap_or_default();
        for handler in handlers {
            handler(self, node, event);
        }
        if event == AnimationEvent::Stopped {
            for callback in self.stop_callbacks.remove(&id).unwrap_or_default() {
                callback(self, node);
            }
            self.finalize_settled_destroys();
        }
    }

    /// Starts the destroy of `node`, consulting its `on_destroy` handler.
    pub fn request_destroy(&mut self, node: NodeId) -> SceneResult<DestroyMode> {
        let handler = self.get_node(node)?.handlers.on_destroy.clone();
        let mode = handler.map_or(DestroyMode::Now, |handler| handler(self, node));
        match mode {
            DestroyMode::Now => self.finalize_destroy(node)?,
            DestroyMode::Deferred | DestroyMode::AfterAnimations => {
                if let Some(el) = self.nodes.get_mut(node) {
                    el.destroy_pending = Some(mode);
                }
                if mode == DestroyMode::AfterAnimations && !self.is_animating(node) {
                    self.finalize_destroy(node)?;
                }
            }
        }
        Ok(mode)
    }

    /// Destroys `node` and its subtree right away. Safe to call repeatedly.
    pub fn finalize_destroy(&mut self, node: NodeId) -> SceneResult<()> {
        if node == self.root || !self.contains(node) {
            return Ok(());
        }
        if let Some(parent) = self.parent(node) {
            if let Some(parent_el) = self.nodes.get_mut(parent) {
                parent_el.children.retain(|c| *c != node);
            }
            if self.is_rendered(parent) && self.is_flex(parent) {
                self.enqueue_layout(parent);
            }
        }

        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().copied());
        }

        let mut first_err = None;
        let mut dropped = Vec::new();
        for current in order.into_iter().rev() {
            self.tweens.cancel_target(current);
            self.scheduler.remove(current);
            self.animations.retain(|id, owner| {
                if *owner == current {
                    dropped.push((*id, current));
                }
                *owner != current
            });
            if self.active_element == Some(current) {
                self.active_element = None;
            }
            let Some(el) = self.nodes.remove(current) else {
                continue;
            };
            if let Some(handle) = el.handle {
                self.handles.remove(&handle);
                if let Err(err) = self.renderer.destroy(handle) {
                    first_err.get_or_insert(err);
                }
            }
        }
        tracing::debug!("destroyed {:?}", node);
        // the renderer never reports Stopped for animations of destroyed handles
        dropped.sort_by_key(|(id, _)| *id);
        for (id, owner) in dropped {
            for callback in self.stop_callbacks.remove(&id).unwrap_or_default() {
                callback(self, owner);
            }
        }
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn finalize_settled_destroys(&mut self) {
        let settled: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, el)| el.destroy_pending == Some(DestroyMode::AfterAnimations))
            .map(|(id, _)| id)
            .filter(|id| !self.is_animating(*id))
            .collect();
        for node in settled {
            if let Err(err) = self.finalize_destroy(node) {
                tracing::warn!("deferred destroy of {:?} failed: {}", node, err);
            }
        }
    }

    pub fn is_animating(&self, node: NodeId) -> bool {
        self.tweens.targets().any(|target| target == node)
            || self
                .nodes
                .get(node)
                .is_some_and(|el| !el.native_targets.is_empty())
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Moves focus: the old element loses the `"focus"` state and gets
    /// `on_blur`, the new one gains it and gets `on_focus`.
    pub fn set_active_element(&mut self, node: Option<NodeId>) {
        if self.active_element == node {
            return;
        }
        let previous = self.active_element.take();
        self.active_element = node;
        if let Some(previous) = previous.filter(|id| self.contains(*id)) {
            self.remove_state(previous, FOCUS_STATE);
            if let Some(handler) = self.nodes.get(previous).and_then(|el| el.handlers.on_blur.clone()) {
                handler(self, previous);
            }
        }
        if let Some(next) = node.filter(|id| self.contains(*id)) {
            self.add_state(next, FOCUS_STATE);
            if let Some(handler) = self.nodes.get(next).and_then(|el| el.handlers.on_focus.clone()) {
                handler(self, next);
            }
        }
    }

    pub fn states(&self, node: NodeId) -> Option<&States> {
        self.nodes.get(node).map(|el| &el.states)
    }

    /// Mutates the state set of `node`; styles are re-applied when `update`
    /// reports a change.
    pub fn update_states<F>(&mut self, node: NodeId, update: F) -> bool
    where
        F: FnOnce(&mut States) -> bool,
    {
        let Some(el) = self.nodes.get_mut(node) else {
            return false;
        };
        let changed = update(&mut el.states);
        if changed {
            self.state_changed(node);
        }
        changed
    }

    pub fn add_state(&mut self, node: NodeId, tag: impl Into<SmolStr>) -> bool {
        let tag = tag.into();
        self.update_states(node, |states| states.add(tag))
    }

    pub fn remove_state(&mut self, node: NodeId, tag: &str) -> bool {
        self.update_states(node, |states| states.remove(tag))
    }

    pub fn toggle_state(&mut self, node: NodeId, tag: impl Into<SmolStr>) -> bool {
        let tag = tag.into();
        self.update_states(node, |states| states.toggle(tag))
    }

    pub fn has_state(&self, node: NodeId, tag: &str) -> bool {
        self.states(node).is_some_and(|states| states.has(tag))
    }

    pub(crate) fn layout_size(&self, node: NodeId) -> (f32, f32) {
        (
            self.layout_number(node, NumProp::Width),
            self.layout_number(node, NumProp::Height),
        )
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("pending_layout", &self.scheduler.len())
            .field("tweens", &self.tweens.len())
            .finish_non_exhaustive()
    }
}
