mod hsl_color;

pub use hsl_color::*;
