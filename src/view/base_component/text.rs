use crate::error::{RenderError, UiError};
use crate::font::{BitmapFont, GlyphBuffers, Justification};
use crate::ui::{BatchId, ElementId, Program, Renderer, Ui, Uniform};
use crate::view::Widget;
use glam::{IVec2, Vec2, Vec3};
use std::rc::Rc;

use super::{Corner, Element};

/// A single-font, single-color string and the glyph batch that draws it.
/// The batch is (re)built lazily on the next draw after a change.
#[derive(Debug)]
pub struct TextLabel {
    text: String,
    font: Rc<BitmapFont>,
    color: Vec3,
    justification: Justification,
    text_size: IVec2,
    char_count: usize,
    batch: Option<(BatchId, usize)>,
    dirty: bool,
}

impl TextLabel {
    pub fn new(font: Rc<BitmapFont>, text: impl Into<String>) -> Self {
        let mut label = Self {
            text: text.into(),
            font,
            color: Vec3::ONE,
            justification: Justification::Left,
            text_size: IVec2::ZERO,
            char_count: 0,
            batch: None,
            dirty: true,
        };
        label.measure();
        label
    }

    pub fn with_color(mut self, color: impl Into<Vec3>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `false` when `text` equals the current string.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.measure();
        self.dirty = true;
        true
    }

    pub fn font(&self) -> &Rc<BitmapFont> {
        &self.font
    }

    pub fn set_font(&mut self, font: Rc<BitmapFont>) {
        self.font = font;
        self.measure();
        self.dirty = true;
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: impl Into<Vec3>) {
        self.color = color.into();
    }

    pub fn justification(&self) -> Justification {
        self.justification
    }

    pub fn set_justification(&mut self, justification: Justification) {
        if self.justification != justification {
            self.justification = justification;
            self.dirty = true;
        }
    }

    /// Width of the string and height of the font, in pixels.
    pub fn text_size(&self) -> IVec2 {
        self.text_size
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    fn measure(&mut self) {
        self.char_count = self.text.chars().count();
        self.text_size = IVec2::new(self.font.text_width(&self.text), self.font.height());
    }

    /// Brings the glyph batch up to date. A string of unchanged length is
    /// rewritten in place; anything else gets a fresh batch.
    pub(crate) fn prepare(
        &mut self,
        scratch: &mut GlyphBuffers,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<BatchId>, RenderError> {
        if !self.dirty {
            return Ok(self.batch.map(|(batch, _)| batch));
        }
        if self.char_count == 0 {
            if let Some((batch, _)) = self.batch.take() {
                renderer.release_batch(batch);
            }
            self.dirty = false;
            return Ok(None);
        }

        let count = scratch.build(&self.font, &self.text, self.justification, 1.0);
        let data = scratch.data(count);
        match self.batch {
            Some((batch, chars)) if chars == count => {
                renderer.update_batch(batch, data.positions, data.uvs);
            }
            _ => {
                if let Some((old, _)) = self.batch.take() {
                    renderer.release_batch(old);
                }
                let batch = renderer.create_batch(Program::Font, data)?;
                self.batch = Some((batch, count));
            }
        }
        self.dirty = false;
        Ok(self.batch.map(|(batch, _)| batch))
    }

    /// Draws the label with its origin at `origin`, limited to the first
    /// `limit` characters when given.
    pub(crate) fn draw(
        &mut self,
        scratch: &mut GlyphBuffers,
        renderer: &mut dyn Renderer,
        origin: Vec2,
        limit: Option<usize>,
    ) -> Result<(), RenderError> {
        let Some(batch) = self.prepare(scratch, renderer)? else {
            return Ok(());
        };
        let chars = limit.map_or(self.char_count, |limit| limit.min(self.char_count));
        if chars == 0 {
            return Ok(());
        }

        renderer.set_blending(true);
        renderer.use_program(Program::Font);
        renderer.bind_texture(self.font.texture().id);
        renderer.set_uniform(Program::Font, "position", Uniform::Vec2(origin));
        renderer.set_uniform(Program::Font, "color", Uniform::Vec3(self.color));
        renderer.draw_batch(batch, chars * 6);
        renderer.set_blending(false);
        Ok(())
    }

    /// Draws the label inside a box whose bottom-left corner is `position`:
    /// vertically centred when the box is taller than the font, and starting
    /// from the box centre for `Center` justification.
    pub(crate) fn draw_boxed(
        &mut self,
        scratch: &mut GlyphBuffers,
        renderer: &mut dyn Renderer,
        position: IVec2,
        size: IVec2,
    ) -> Result<(), RenderError> {
        let mut origin = position;
        if size.y > self.text_size.y {
            origin.y += (size.y - self.text_size.y) / 2;
        }
        if self.justification == Justification::Center {
            origin.x += size.x / 2;
        }
        self.draw(scratch, renderer, origin.as_vec2(), None)
    }

    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        if let Some((batch, _)) = self.batch.take() {
            out.push(batch);
        }
        self.dirty = true;
    }
}

/// A text element. The string is vertically centered when the element is
/// taller than the font, and centered horizontally for `Center` justification.
#[derive(Debug)]
pub struct Text {
    label: TextLabel,
    padding: IVec2,
}

pub struct TextProps {
    pub font: Rc<BitmapFont>,
    pub text: String,
    pub color: Vec3,
    pub justification: Justification,
    pub position: IVec2,
    pub anchor: Corner,
    /// Element size; defaults to the measured text size.
    pub size: Option<IVec2>,
    pub padding: IVec2,
}

impl TextProps {
    pub fn new(font: Rc<BitmapFont>, text: impl Into<String>) -> Self {
        Self {
            font,
            text: text.into(),
            color: Vec3::ONE,
            justification: Justification::Left,
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            size: None,
            padding: IVec2::ZERO,
        }
    }
}

pub fn build_text(ui: &mut Ui, props: TextProps) -> ElementId {
    let label = TextLabel::new(props.font, props.text)
        .with_color(props.color)
        .with_justification(props.justification);
    let size = props.size.unwrap_or(label.text_size());
    let element = Element::leaf(Widget::Text(Text {
        label,
        padding: props.padding,
    }))
    .with_position(props.position)
    .with_anchor(props.anchor)
    .with_size(size);
    ui.insert(element)
}

impl Text {
    pub fn text(&self) -> &str {
        self.label.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.label.set_text(text);
    }

    pub fn color(&self) -> Vec3 {
        self.label.color()
    }

    pub fn set_color(&mut self, color: impl Into<Vec3>) {
        self.label.set_color(color);
    }

    pub fn font(&self) -> &Rc<BitmapFont> {
        self.label.font()
    }

    pub fn set_font(&mut self, font: Rc<BitmapFont>) {
        self.label.set_font(font);
    }

    pub fn justification(&self) -> Justification {
        self.label.justification()
    }

    pub fn set_justification(&mut self, justification: Justification) {
        self.label.set_justification(justification);
    }

    pub fn padding(&self) -> IVec2 {
        self.padding
    }

    pub fn set_padding(&mut self, padding: IVec2) {
        self.padding = padding;
    }

    pub fn text_size(&self) -> IVec2 {
        self.label.text_size()
    }

    pub(crate) fn label_mut(&mut self) -> &mut TextLabel {
        &mut self.label
    }

    pub(crate) fn paint(
        &mut self,
        ui: &mut Ui,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), UiError> {
        let Ok(element) = ui.element(id) else {
            return Ok(());
        };
        let (position, size) = (element.corrected_position(), element.size());
        self.label.draw_boxed(
            ui.fonts.scratch_mut(),
            renderer,
            position + self.padding,
            size,
        )?;
        Ok(())
    }

    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        self.label.retire(out);
    }
}
