//! Error types shared by the scene and renderer boundary.

use thiserror::Error;

use crate::renderer::HandleId;
use crate::style::PropKey;
use crate::view::NodeId;

/// Failures reported by a [`Renderer`](crate::renderer::Renderer) implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("unknown renderer handle: {0:?}")]
    UnknownHandle(HandleId),

    #[error("shader props rejected: {0}")]
    ShaderRejected(String),

    #[error("texture source rejected: {0}")]
    TextureRejected(String),

    #[error("renderer backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not rendered")]
    NotRendered(NodeId),

    #[error("property `{key:?}` expects {expected}")]
    PropType {
        key: PropKey,
        expected: &'static str,
    },

    #[error("unknown timing function: {0}")]
    UnknownTimingFunction(String),

    #[error(transparent)]
    Renderer(#[from] RenderError),
}

pub type SceneResult<T> = Result<T, SceneError>;
