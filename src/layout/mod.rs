pub mod flex;
mod scheduler;

pub use flex::{FlexContainer, FlexItem, FlexOutcome, ItemLayout};
pub use scheduler::LayoutScheduler;

use once_cell::sync::Lazy;

static TRACE_LAYOUT: Lazy<bool> = Lazy::new(|| std::env::var("GLINT_TRACE_LAYOUT").is_ok());

/// Per-node layout tracing, switched on by the `GLINT_TRACE_LAYOUT` variable.
pub(crate) fn trace_layout_enabled() -> bool {
    *TRACE_LAYOUT
}
