mod color;
mod effects;
mod layout;
mod property;
mod sheet;

pub use color::*;
pub use effects::*;
pub use layout::*;
pub use property::*;
pub use sheet::*;
