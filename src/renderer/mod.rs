//! The rendering-engine contract the scene drives.
//!
//! A renderer owns drawable primitives addressed by [`HandleId`]. The scene
//! creates one handle per rendered element, writes numbers and colors to it,
//! and asks the renderer to run native animations. Events flow back through
//! [`Renderer::poll_events`].

mod headless;
pub use headless::*;

use std::any::Any;

use smol_str::SmolStr;

use crate::error::RenderError;
use crate::style::{Color, ColorProp, Contain, FontStyle, NumProp, ShaderKind, ShaderProps, TextAlign};
use crate::transition::{AnimTarget, AnimationCommand, AnimationEvent, AnimationId, AnimationSettings, AnimationState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct HandleId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ShaderId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Image,
    Svg,
}

impl TextureKind {
    pub fn for_src(src: &str) -> Self {
        if src.to_ascii_lowercase().ends_with(".svg") {
            Self::Svg
        } else {
            Self::Image
        }
    }
}

/// Visibility of a handle relative to the renderer's bounds margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoundsState {
    #[default]
    Init,
    OutOfBounds,
    InBounds,
    InViewport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeEventKind {
    Loaded,
    Failed,
    Bounds,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeEvent {
    /// Text measured or texture decoded, with the resulting size.
    Loaded { width: f32, height: f32 },
    Failed(String),
    Bounds(BoundsState),
}

impl NodeEvent {
    pub fn kind(&self) -> NodeEventKind {
        match self {
            Self::Loaded { .. } => NodeEventKind::Loaded,
            Self::Failed(_) => NodeEventKind::Failed,
            Self::Bounds(_) => NodeEventKind::Bounds,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RendererEvent {
    Node { handle: HandleId, event: NodeEvent },
    Animation { id: AnimationId, event: AnimationEvent },
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct TextProps {
    pub text: SmolStr,
    pub font_family: SmolStr,
    pub font_weight: i32,
    pub font_style: FontStyle,
    pub max_lines: Option<u32>,
    pub contain: Contain,
    pub text_align: TextAlign,
    pub overflow_suffix: Option<SmolStr>,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
}

/// Everything a handle is created with.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NodeProps {
    pub parent: Option<HandleId>,
    pub numbers: Vec<(NumProp, f32)>,
    pub colors: Vec<(ColorProp, Color)>,
    pub clipping: bool,
    pub texture: Option<TextureId>,
    pub shader: Option<ShaderId>,
    pub text: Option<TextProps>,
}

impl NodeProps {
    pub fn number(&self, prop: NumProp) -> Option<f32> {
        self.numbers
            .iter()
            .rev()
            .find(|(key, _)| *key == prop)
            .map(|(_, value)| *value)
    }
}

/// Non-numeric handle properties settable after creation.
#[derive(Clone, Debug, PartialEq)]
pub enum RendererProp {
    Clipping(bool),
    Texture(Option<TextureId>),
    Shader(Option<ShaderId>),
    Text(SmolStr),
    FontFamily(SmolStr),
    FontWeight(i32),
    FontStyle(FontStyle),
    MaxLines(Option<u32>),
    Contain(Contain),
    TextAlign(TextAlign),
    OverflowSuffix(Option<SmolStr>),
    MaxWidth(Option<f32>),
    MaxHeight(Option<f32>),
}

pub trait Renderer: Any {
    /// Creates the already-rendered root every scene hangs off.
    fn create_root(&mut self, width: f32, height: f32) -> Result<HandleId, RenderError>;
    fn create_node(&mut self, props: &NodeProps) -> Result<HandleId, RenderError>;
    fn create_text_node(&mut self, props: &NodeProps) -> Result<HandleId, RenderError>;
    fn set_parent(&mut self, handle: HandleId, parent: Option<HandleId>) -> Result<(), RenderError>;
    fn destroy(&mut self, handle: HandleId) -> Result<(), RenderError>;

    fn set_number(&mut self, handle: HandleId, prop: NumProp, value: f32) -> Result<(), RenderError>;
    fn number(&self, handle: HandleId, prop: NumProp) -> Option<f32>;
    fn set_color(&mut self, handle: HandleId, prop: ColorProp, value: Color) -> Result<(), RenderError>;
    fn color(&self, handle: HandleId, prop: ColorProp) -> Option<Color>;
    fn set_prop(&mut self, handle: HandleId, prop: &RendererProp) -> Result<(), RenderError>;

    /// Prepares an animation; it runs once started through
    /// [`control_animation`](Self::control_animation).
    fn animate(
        &mut self,
        handle: HandleId,
        targets: &[AnimTarget],
        settings: &AnimationSettings,
    ) -> Result<AnimationId, RenderError>;
    fn control_animation(&mut self, id: AnimationId, command: AnimationCommand) -> Result<(), RenderError>;
    fn animation_state(&self, id: AnimationId) -> AnimationState;

    fn create_texture(&mut self, kind: TextureKind, src: &str) -> Result<TextureId, RenderError>;
    fn create_shader(&mut self, kind: ShaderKind, props: &ShaderProps) -> Result<ShaderId, RenderError>;

    /// Asks for `kind` events on `handle` to be reported by `poll_events`.
    fn subscribe(&mut self, handle: HandleId, kind: NodeEventKind) -> Result<(), RenderError>;

    fn poll_events(&mut self) -> Vec<RendererEvent> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
