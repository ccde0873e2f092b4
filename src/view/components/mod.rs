mod button;
mod checkbox;
mod color_gradient;
mod console;
mod dialog_box;
mod list_box;
mod slider;
mod text_box;
mod text_input;

pub use button::*;
pub use checkbox::*;
pub use color_gradient::*;
pub use console::*;
pub use dialog_box::*;
pub use list_box::*;
pub use slider::*;
pub use text_box::*;
pub use text_input::*;
