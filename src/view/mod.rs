pub(crate) mod base_component;
pub mod components;
mod widget;

pub use base_component::{
    Corner, Element, ElementFlags, ElementKind, Text, TextLabel, TextProps, build_text,
};
pub(crate) use base_component::ParentFrame;
pub use components::*;
pub(crate) use widget::PaintEvent;
pub use widget::{Widget, WidgetState};
