//! Retained-mode scene graph for remote-driven UIs.
//!
//! A [`Scene`] owns a tree of [`ElementNode`]s backed by a [`Renderer`].
//! Property writes go through one dispatch path that decides between
//! animating and snapping, flex containers are laid out in microtask-batched
//! passes, and state tags layer style overrides that revert cleanly.

pub mod config;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod states;
pub mod style;
pub mod transition;
pub mod view;

pub use config::{Config, FontSettings};
pub use error::{RenderError, SceneError, SceneResult};
pub use renderer::{HeadlessRenderer, Renderer};
pub use states::States;
pub use style::{Color, ColorProp, NumProp, PropKey, PropValue, Style};
pub use transition::{AnimationSettings, TimeFunction, TransitionSpec};
pub use view::*;
