mod core;
mod element;
mod text;

pub use self::core::Corner;
pub(crate) use self::core::{ElementCore, ParentFrame};
pub use element::*;
pub use text::*;
