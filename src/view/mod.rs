mod animation;
mod dispatch;
mod effects;
mod element;
mod layout;
mod render;
mod scene;
mod style_states;
mod text;

pub use animation::{AnimationController, color_target, number_target};
pub use element::*;
pub use scene::*;

slotmap::new_key_type! {
    /// Arena key of an [`ElementNode`] inside its [`Scene`].
    pub struct NodeId;
}
