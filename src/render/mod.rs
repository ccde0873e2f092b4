mod recording;
mod shaders;

pub use recording::*;
pub use shaders::*;
