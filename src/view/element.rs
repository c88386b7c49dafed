use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::{NodeId, Scene};
use crate::renderer::{HandleId, NodeEvent, NodeEventKind};
use crate::states::States;
use crate::style::{PropKey, PropValue, ShaderProps, Style};
use crate::transition::{AnimKey, AnimValue, AnimationEvent, AnimationId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    /// Renders text composed from its text-leaf children.
    TextContainer,
    TextLeaf,
}

/// What `on_destroy` asks the scene to do with the node's handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DestroyMode {
    #[default]
    Now,
    /// The caller finishes the destroy later through `finalize_destroy`.
    Deferred,
    /// Finalized by the frame loop once the node has no running animation.
    AfterAnimations,
}

pub type NodeHandler = Rc<dyn Fn(&mut Scene, NodeId)>;
pub type LayoutHandler = Rc<dyn Fn(&mut Scene, NodeId) -> bool>;
pub type DestroyHandler = Rc<dyn Fn(&mut Scene, NodeId) -> DestroyMode>;
pub type EventHandler = Rc<dyn Fn(&mut Scene, NodeId, &NodeEvent)>;
pub type AnimationHandler = Rc<dyn Fn(&mut Scene, NodeId, AnimationEvent)>;

#[derive(Clone, Default)]
pub(crate) struct Handlers {
    pub(crate) on_create: Option<NodeHandler>,
    pub(crate) on_render: Option<NodeHandler>,
    pub(crate) on_destroy: Option<DestroyHandler>,
    pub(crate) on_remove: Option<NodeHandler>,
    pub(crate) on_layout: Option<LayoutHandler>,
    pub(crate) on_focus: Option<NodeHandler>,
    pub(crate) on_blur: Option<NodeHandler>,
    pub(crate) on_event: Vec<(NodeEventKind, EventHandler)>,
    pub(crate) on_animation: Vec<AnimationHandler>,
}

/// One node of the scene tree.
///
/// Renderer-backed numbers and colors are buffered in `props` until the node
/// renders; from then on the renderer handle holds them.
pub struct ElementNode {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) handle: Option<HandleId>,
    pub(crate) props: FxHashMap<PropKey, PropValue>,
    pub(crate) explicit: FxHashSet<PropKey>,
    pub(crate) style: Option<Style>,
    pub(crate) states: States,
    pub(crate) undo: FxHashMap<PropKey, Option<PropValue>>,
    pub(crate) calc_width: bool,
    pub(crate) calc_height: bool,
    pub(crate) pre_flex_width: Option<f32>,
    pub(crate) pre_flex_height: Option<f32>,
    /// Scheduler pass in which grow last redistributed this container.
    pub(crate) contains_flex_grow: Option<u64>,
    pub(crate) has_rendered_children: bool,
    pub(crate) shader_props: ShaderProps,
    pub(crate) native_targets: FxHashMap<AnimKey, (AnimationId, AnimValue)>,
    pub(crate) destroy_pending: Option<DestroyMode>,
    pub(crate) handlers: Handlers,
}

impl ElementNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            handle: None,
            props: FxHashMap::default(),
            explicit: FxHashSet::default(),
            style: None,
            states: States::new(),
            undo: FxHashMap::default(),
            calc_width: false,
            calc_height: false,
            pre_flex_width: None,
            pre_flex_height: None,
            contains_flex_grow: None,
            has_rendered_children: false,
            shader_props: ShaderProps::default(),
            native_targets: FxHashMap::default(),
            destroy_pending: None,
            handlers: Handlers::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn handle(&self) -> Option<HandleId> {
        self.handle
    }

    pub fn is_rendered(&self) -> bool {
        self.handle.is_some()
    }

    pub fn states(&self) -> &States {
        &self.states
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn calc_width(&self) -> bool {
        self.calc_width
    }

    pub fn calc_height(&self) -> bool {
        self.calc_height
    }

    pub fn pre_flex_width(&self) -> Option<f32> {
        self.pre_flex_width
    }

    pub fn pre_flex_height(&self) -> Option<f32> {
        self.pre_flex_height
    }

    pub fn has_rendered_children(&self) -> bool {
        self.has_rendered_children
    }

    pub fn shader_props(&self) -> &ShaderProps {
        &self.shader_props
    }

    pub fn destroy_pending(&self) -> Option<DestroyMode> {
        self.destroy_pending
    }

    /// Text of a text leaf.
    pub fn text(&self) -> Option<&SmolStr> {
        match self.props.get(&PropKey::Text) {
            Some(PropValue::Str(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_explicit(&self, key: PropKey) -> bool {
        self.explicit.contains(&key)
    }

    pub fn on_create<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) + 'static,
    {
        self.handlers.on_create = Some(Rc::new(handler));
    }

    pub fn on_render<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) + 'static,
    {
        self.handlers.on_render = Some(Rc::new(handler));
    }

    pub fn on_destroy<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) -> DestroyMode + 'static,
    {
        self.handlers.on_destroy = Some(Rc::new(handler));
    }

    pub fn on_remove<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) + 'static,
    {
        self.handlers.on_remove = Some(Rc::new(handler));
    }

    /// Runs after every layout pass of this node; returning `true` asks the
    /// parent to lay out again.
    pub fn on_layout<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) -> bool + 'static,
    {
        self.handlers.on_layout = Some(Rc::new(handler));
    }

    pub fn on_focus<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) + 'static,
    {
        self.handlers.on_focus = Some(Rc::new(handler));
    }

    pub fn on_blur<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId) + 'static,
    {
        self.handlers.on_blur = Some(Rc::new(handler));
    }

    /// Subscribes to a renderer event; wired to the handle on render.
    pub fn on_event<F>(&mut self, kind: NodeEventKind, handler: F)
    where
        F: Fn(&mut Scene, NodeId, &NodeEvent) + 'static,
    {
        self.handlers.on_event.push((kind, Rc::new(handler)));
    }

    pub fn on_animation<F>(&mut self, handler: F)
    where
        F: Fn(&mut Scene, NodeId, AnimationEvent) + 'static,
    {
        self.handlers.on_animation.push(Rc::new(handler));
    }

    pub(crate) fn has_layout_hook(&self) -> bool {
        self.handlers.on_layout.is_some()
    }
}

impl std::fmt::Debug for ElementNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementNode")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("handle", &self.handle)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}
