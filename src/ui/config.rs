use crate::font::GlyphBuffers;
use crate::render::ShaderVersion;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub shader_version: ShaderVersion,
    /// Directory holding the stock `font{N}.fnt` descriptors.
    pub font_directory: PathBuf,
    /// Initial capacity, in characters, of the glyph scratch pool.
    pub glyph_capacity: usize,
}

impl UiConfig {
    pub fn new() -> Self {
        Self {
            shader_version: ShaderVersion::default(),
            font_directory: PathBuf::from("fonts"),
            glyph_capacity: GlyphBuffers::DEFAULT_CAPACITY,
        }
    }

    pub fn with_shader_version(mut self, version: ShaderVersion) -> Self {
        self.shader_version = version;
        self
    }

    pub fn with_font_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.font_directory = directory.into();
        self
    }

    pub fn with_glyph_capacity(mut self, capacity: usize) -> Self {
        self.glyph_capacity = capacity.max(1);
        self
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::new()
    }
}
