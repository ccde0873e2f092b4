use crate::error::FontError;
use crate::font::{BitmapFont, GlyphBuffers};
use crate::ui::Renderer;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Stock font sizes shipped as `font{N}.fnt` in the font directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontSize {
    Pt12,
    Pt14,
    Pt16,
    Pt24,
    Pt32,
    Pt48,
}

impl FontSize {
    pub fn points(self) -> u32 {
        match self {
            FontSize::Pt12 => 12,
            FontSize::Pt14 => 14,
            FontSize::Pt16 => 16,
            FontSize::Pt24 => 24,
            FontSize::Pt32 => 32,
            FontSize::Pt48 => 48,
        }
    }

    pub fn file_name(self) -> String {
        format!("font{}.fnt", self.points())
    }
}

/// Fonts loaded by this UI, keyed by descriptor path, plus the glyph
/// scratch pool used to build text batches.
pub struct FontCache {
    directory: PathBuf,
    fonts: FxHashMap<PathBuf, Rc<BitmapFont>>,
    scratch: GlyphBuffers,
}

impl FontCache {
    pub fn new(directory: impl Into<PathBuf>, glyph_capacity: usize) -> Self {
        Self {
            directory: directory.into(),
            fonts: FxHashMap::default(),
            scratch: GlyphBuffers::new(glyph_capacity),
        }
    }

    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        renderer: &mut dyn Renderer,
    ) -> Result<Rc<BitmapFont>, FontError> {
        let path = path.as_ref();
        if let Some(font) = self.fonts.get(path) {
            return Ok(Rc::clone(font));
        }
        let font = match BitmapFont::load(path, renderer) {
            Ok(font) => Rc::new(font),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load bitmap font");
                return Err(err);
            }
        };
        tracing::info!(path = %path.display(), height = font.height(), "loaded bitmap font");
        self.fonts.insert(path.to_path_buf(), Rc::clone(&font));
        Ok(font)
    }

    pub fn load_size(
        &mut self,
        size: FontSize,
        renderer: &mut dyn Renderer,
    ) -> Result<Rc<BitmapFont>, FontError> {
        let path = self.directory.join(size.file_name());
        self.load(path, renderer)
    }

    /// Registers a font built outside the cache, e.g. from an in-memory
    /// descriptor. An existing entry for `path` is kept.
    pub fn insert(&mut self, path: impl Into<PathBuf>, font: BitmapFont) -> Rc<BitmapFont> {
        Rc::clone(self.fonts.entry(path.into()).or_insert_with(|| Rc::new(font)))
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Rc<BitmapFont>> {
        self.fonts.get(path.as_ref()).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn scratch_mut(&mut self) -> &mut GlyphBuffers {
        &mut self.scratch
    }

    /// Releases every font texture and forgets the cached fonts.
    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        for (_, font) in self.fonts.drain() {
            renderer.release_texture(font.texture().id);
        }
    }
}
