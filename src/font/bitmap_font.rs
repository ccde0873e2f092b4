use crate::error::{FontError, RenderError};
use crate::font::LINE_PITCH;
use crate::ui::{Renderer, Texture};
use glam::Vec2;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Metrics and texture coordinates of a single glyph.
///
/// `uv_min` is the top-left corner of the glyph in uv space and `uv_max`
/// the bottom-right one. Because texture rows run top-down, `uv_max.y` is
/// smaller than `uv_min.y`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Glyph {
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    pub width: f32,
    pub height: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right,
}

/// A single-page BMFont bitmap font.
#[derive(Debug)]
pub struct BitmapFont {
    source: PathBuf,
    texture: Texture,
    glyphs: FxHashMap<char, Glyph>,
    kerning: FxHashMap<(char, char), i32>,
    height: i32,
}

impl BitmapFont {
    /// Reads a `.fnt` descriptor and uploads its page texture. The texture
    /// path is resolved relative to the descriptor's directory.
    pub fn load(path: &Path, renderer: &mut dyn Renderer) -> Result<Self, FontError> {
        let descriptor = std::fs::read_to_string(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = path.parent().unwrap_or(Path::new(""));
        let mut font =
            Self::from_descriptor(&descriptor, directory, |file| renderer.load_texture(file))?;
        font.source = path.to_path_buf();
        Ok(font)
    }

    pub fn from_descriptor<F>(
        descriptor: &str,
        directory: &Path,
        mut load_texture: F,
    ) -> Result<Self, FontError>
    where
        F: FnMut(&Path) -> Result<Texture, RenderError>,
    {
        let mut texture: Option<Texture> = None;
        let mut glyphs = FxHashMap::default();
        let mut kerning = FxHashMap::default();
        let mut height = 0;

        for (index, line) in descriptor.lines().enumerate() {
            let line_no = index + 1;
            if line.starts_with("page") {
                let mut file = None;
                for (key, value) in fields(line) {
                    match key {
                        "id" => {
                            let id = parse_int(line_no, key, value)?;
                            if id != 0 {
                                return Err(FontError::MultiPage(id));
                            }
                        }
                        "file" => file = Some(value.trim_matches('"')),
                        _ => {}
                    }
                }
                if texture.is_some() {
                    return Err(FontError::Malformed {
                        line: line_no,
                        message: "page 0 declared twice".to_string(),
                    });
                }
                let Some(file) = file else {
                    return Err(FontError::Malformed {
                        line: line_no,
                        message: "page record without a file".to_string(),
                    });
                };
                texture = Some(load_texture(&directory.join(file))?);
            } else if line.starts_with("char ") {
                let Some(page) = texture else {
                    return Err(FontError::MissingPage);
                };
                if page.width == 0 || page.height == 0 {
                    return Err(FontError::Malformed {
                        line: line_no,
                        message: "page texture has zero size".to_string(),
                    });
                }
                let (id, glyph) = parse_char(line_no, line, page)?;
                height = height.max(glyph.height as i32);
                glyphs.entry(id).or_insert(glyph);
            } else if line.starts_with("kerning ") {
                let (mut first, mut second, mut amount) = (' ', ' ', 0);
                for (key, value) in fields(line) {
                    match key {
                        "first" => first = parse_char_id(line_no, value)?,
                        "second" => second = parse_char_id(line_no, value)?,
                        "amount" => amount = parse_int(line_no, key, value)? as i32,
                        _ => {}
                    }
                }
                kerning.insert((first, second), amount);
            }
        }

        let texture = texture.ok_or(FontError::MissingPage)?;
        tracing::debug!(
            glyphs = glyphs.len(),
            kerning_pairs = kerning.len(),
            height,
            "parsed bitmap font"
        );
        Ok(Self {
            source: PathBuf::new(),
            texture,
            glyphs,
            kerning,
            height,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// Height of the tallest glyph, in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn line_height(&self) -> f32 {
        self.height as f32 * LINE_PITCH
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Glyph used to draw `c`. Unknown characters fall back to the space glyph.
    pub fn resolve(&self, c: char) -> Glyph {
        self.glyphs
            .get(&c)
            .or_else(|| self.glyphs.get(&' '))
            .copied()
            .unwrap_or_default()
    }

    pub fn char_width(&self, c: char) -> i32 {
        self.resolve(c).x_advance as i32 + 1
    }

    pub fn text_width(&self, text: &str) -> i32 {
        text.chars().map(|c| self.char_width(c)).sum()
    }

    /// Kerning adjustment for a character pair. Parsed for completeness,
    /// text layout does not apply it.
    pub fn kerning(&self, first: char, second: char) -> Option<i32> {
        self.kerning.get(&(first, second)).copied()
    }

    pub fn kerning_pairs(&self) -> usize {
        self.kerning.len()
    }
}

fn fields(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.split_whitespace().filter_map(|token| token.split_once('='))
}

fn parse_int(line: usize, key: &str, value: &str) -> Result<i64, FontError> {
    value.parse::<i64>().map_err(|_| FontError::Malformed {
        line,
        message: format!("`{key}` expects an integer, found `{value}`"),
    })
}

fn parse_char_id(line: usize, value: &str) -> Result<char, FontError> {
    let code = parse_int(line, "id", value)?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| FontError::Malformed {
            line,
            message: format!("{code} is not a valid character code"),
        })
}

fn parse_char(line_no: usize, line: &str, page: Texture) -> Result<(char, Glyph), FontError> {
    let page_width = page.width as f32;
    let page_height = page.height as f32;
    let mut id = '\0';
    let (mut x, mut y) = (0.0, 0.0);
    let mut glyph = Glyph::default();

    for (key, value) in fields(line) {
        if key == "id" {
            id = parse_char_id(line_no, value)?;
            continue;
        }
        let number = || parse_int(line_no, key, value).map(|v| v as f32);
        match key {
            "x" => x = number()?,
            "y" => y = number()?,
            "width" => glyph.width = number()?,
            "height" => glyph.height = number()?,
            "xoffset" => glyph.x_offset = number()?,
            "yoffset" => glyph.y_offset = number()?,
            "xadvance" => glyph.x_advance = number()?,
            _ => {}
        }
    }

    glyph.uv_min = Vec2::new(x / page_width, 1.0 - y / page_height);
    glyph.uv_max = Vec2::new(
        glyph.uv_min.x + glyph.width / page_width,
        glyph.uv_min.y - glyph.height / page_height,
    );
    Ok((id, glyph))
}
