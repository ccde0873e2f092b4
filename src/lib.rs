//! A retained-mode widget toolkit. Elements live in a tree owned by [`Ui`],
//! are positioned by anchor corners, receive pointer and keyboard input from
//! the host, and draw through the [`Renderer`] contract.

pub mod error;
pub mod font;
pub mod render;
pub mod style;
pub mod ui;
pub mod view;

pub use error::{FontError, RenderError, UiError};
pub use font::{BitmapFont, FontCache, FontSize, Justification};
pub use ui::{Click, ElementId, MouseButton, MouseEvent, MouseState, Renderer, Ui, UiConfig};
pub use view::{Corner, Element, Widget};
