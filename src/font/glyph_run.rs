use crate::font::{BitmapFont, Justification};
use crate::ui::BatchData;
use glam::{Vec2, Vec3};

/// Scratch vertex/uv/index arrays shared by every string build.
///
/// Capacity is counted in characters. When a string does not fit, the
/// capacity grows to 1.5x the string length and all three arrays are
/// reallocated together.
#[derive(Debug)]
pub struct GlyphBuffers {
    capacity: usize,
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
}

impl GlyphBuffers {
    pub const DEFAULT_CAPACITY: usize = 200;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            positions: vec![Vec3::ZERO; capacity * 4],
            uvs: vec![Vec2::ZERO; capacity * 4],
            indices: vec![0; capacity * 6],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn reserve(&mut self, chars: usize) {
        if chars <= self.capacity {
            return;
        }
        let capacity = (chars as f64 * 1.5) as usize;
        tracing::trace!(from = self.capacity, to = capacity, "growing glyph scratch pool");
        *self = Self::new(capacity);
    }

    /// Lays `text` out into the scratch arrays and returns its character count.
    pub fn build(
        &mut self,
        font: &BitmapFont,
        text: &str,
        justification: Justification,
        scale: f32,
    ) -> usize {
        let count = text.chars().count();
        self.reserve(count);

        let mut x = match justification {
            Justification::Left => 0,
            Justification::Center => -font.text_width(text) / 2,
            Justification::Right => -font.text_width(text),
        };
        let height = font.height() as f32;

        for (i, c) in text.chars().enumerate() {
            let glyph = font.resolve(c);
            let top = height - glyph.y_offset;
            x += 1;
            let left = x as f32;
            let right = left + glyph.width;

            let v = i * 4;
            self.positions[v] = Vec3::new(left, top, 0.0) * scale;
            self.positions[v + 1] = Vec3::new(left, top - glyph.height, 0.0) * scale;
            self.positions[v + 2] = Vec3::new(right, top, 0.0) * scale;
            self.positions[v + 3] = Vec3::new(right, top - glyph.height, 0.0) * scale;

            self.uvs[v] = glyph.uv_min;
            self.uvs[v + 1] = Vec2::new(glyph.uv_min.x, glyph.uv_max.y);
            self.uvs[v + 2] = Vec2::new(glyph.uv_max.x, glyph.uv_min.y);
            self.uvs[v + 3] = glyph.uv_max;

            let base = v as u32;
            self.indices[i * 6..i * 6 + 6]
                .copy_from_slice(&[base + 2, base, base + 1, base + 3, base + 2, base + 1]);

            x += glyph.x_advance as i32;
            if c == '_' {
                x += 3;
            }
        }
        count
    }

    /// Geometry of the first `chars` characters of the last build.
    pub fn data(&self, chars: usize) -> BatchData<'_> {
        BatchData {
            positions: &self.positions[..chars * 4],
            uvs: &self.uvs[..chars * 4],
            indices: &self.indices[..chars * 6],
        }
    }
}

impl Default for GlyphBuffers {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
