use crate::error::UiError;
use crate::font::{BitmapFont, Justification};
use crate::ui::{BatchId, ElementId, Renderer, Texture, Ui};
use crate::view::base_component::{Corner, Element, TextLabel};
use crate::view::Widget;
use glam::{IVec2, Vec4};
use std::rc::Rc;

const BUTTON_GREY: Vec4 = Vec4::new(0.3, 0.3, 0.3, 1.0);
const BUTTON_GREEN: Vec4 = Vec4::new(0.3, 0.9, 0.3, 1.0);

/// A clickable quad, either textured or flat-colored, with an optional
/// centred caption. While `enabled` it is drawn in its enabled color.
#[derive(Debug)]
pub struct Button {
    enabled: bool,
    enabled_color: Vec4,
    font: Option<Rc<BitmapFont>>,
    caption: Option<TextLabel>,
}

pub struct ButtonProps {
    pub texture: Option<Texture>,
    /// Ignored when a texture is given; the button takes the texture's size.
    pub size: IVec2,
    pub position: IVec2,
    pub anchor: Corner,
    pub name: Option<String>,
    pub caption: Option<(Rc<BitmapFont>, String)>,
}

impl ButtonProps {
    pub fn new(size: IVec2) -> Self {
        Self {
            texture: None,
            size,
            position: IVec2::ZERO,
            anchor: Corner::TopLeft,
            name: None,
            caption: None,
        }
    }

    pub fn textured(texture: Texture) -> Self {
        Self {
            texture: Some(texture),
            ..Self::new(texture.size())
        }
    }

    pub fn with_caption(mut self, font: Rc<BitmapFont>, text: impl Into<String>) -> Self {
        self.caption = Some((font, text.into()));
        self
    }
}

pub fn build_button(ui: &mut Ui, props: ButtonProps) -> ElementId {
    ui.insert(button_element(props))
}

pub(crate) fn button_element(props: ButtonProps) -> Element {
    let (background, enabled_color) = match props.texture {
        Some(_) => (Vec4::ZERO, Vec4::ZERO),
        None => (BUTTON_GREY, BUTTON_GREEN),
    };
    let size = props.texture.map_or(props.size, |texture| texture.size());

    let mut button = Button {
        enabled: false,
        enabled_color,
        font: None,
        caption: None,
    };
    if let Some((font, text)) = props.caption {
        button.set_font(font);
        button.set_text(text);
    }

    let mut element = Element::leaf(Widget::Button(button))
        .with_position(props.position)
        .with_anchor(props.anchor)
        .with_size(size)
        .with_background_color(background);
    if let Some(texture) = props.texture {
        element = element.with_background_texture(texture);
    }
    if let Some(name) = props.name {
        element = element.with_name(name);
    }
    element
}

impl Button {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled_color(&self) -> Vec4 {
        self.enabled_color
    }

    pub fn set_enabled_color(&mut self, color: impl Into<Vec4>) {
        self.enabled_color = color.into();
    }

    pub fn text(&self) -> Option<&str> {
        self.caption.as_ref().map(TextLabel::text)
    }

    /// Sets the caption. Without a font the text is dropped until one is set.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(caption) = &mut self.caption {
            caption.set_text(text);
        } else if let Some(font) = &self.font {
            if !text.is_empty() {
                self.caption = Some(
                    TextLabel::new(Rc::clone(font), text).with_justification(Justification::Center),
                );
            }
        }
    }

    pub fn font(&self) -> Option<&Rc<BitmapFont>> {
        self.font.as_ref()
    }

    pub fn set_font(&mut self, font: Rc<BitmapFont>) {
        if let Some(caption) = &mut self.caption {
            caption.set_font(Rc::clone(&font));
        }
        self.font = Some(font);
    }

    pub(crate) fn active_color(&self) -> Option<Vec4> {
        self.enabled.then_some(self.enabled_color)
    }

    pub(crate) fn paint(
        &mut self,
        ui: &mut Ui,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), UiError> {
        let Some(caption) = &mut self.caption else {
            return Ok(());
        };
        let element = ui.element(id)?;
        let (position, size) = (element.corrected_position(), element.size());
        caption.draw_boxed(ui.fonts.scratch_mut(), renderer, position, size)?;
        Ok(())
    }

    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        if let Some(caption) = &mut self.caption {
            caption.retire(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ButtonProps, build_button};
    use crate::font::fixed_width_font;
    use crate::render::{RecordingRenderer, RenderCall};
    use crate::ui::{Program, Texture, TextureId, Ui, UiConfig, Uniform};
    use crate::view::{Button, Corner};
    use glam::{IVec2, Vec4};

    #[test]
    fn textured_button_takes_texture_size_and_top_left_anchor() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let texture = Texture {
            id: TextureId(3),
            width: 64,
            height: 32,
        };
        let id = build_button(&mut ui, ButtonProps::textured(texture));
        let element = ui.element(id).unwrap();
        assert_eq!(element.size(), IVec2::new(64, 32));
        assert_eq!(element.anchor(), Corner::TopLeft);
        assert_eq!(element.background_color(), Vec4::ZERO);
        assert_eq!(element.background_texture(), Some(texture));
    }

    #[test]
    fn enabled_button_draws_its_enabled_color() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_button(
            &mut ui,
            ButtonProps::new(IVec2::new(100, 30)).with_caption(fixed_width_font(7, 16), "OK"),
        );
        ui.add_to_root(id).unwrap();
        ui.widget_mut::<Button>(id).unwrap().set_enabled(true);

        let mut renderer = RecordingRenderer::new();
        ui.draw(&mut renderer).unwrap();
        assert!(renderer.calls().contains(&RenderCall::SetUniform {
            program: Program::SolidUi,
            name: "color".into(),
            value: Uniform::Vec4(Vec4::new(0.3, 0.9, 0.3, 1.0)),
        }));
        // Background quad plus the two caption glyphs.
        assert_eq!(renderer.draws().len(), 2);
        assert_eq!(renderer.draws()[1].1, 12);
    }

    #[test]
    fn caption_requires_a_font() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_button(&mut ui, ButtonProps::new(IVec2::new(100, 30)));
        let button = ui.widget_mut::<Button>(id).unwrap();
        button.set_text("ignored");
        assert_eq!(button.text(), None);
        button.set_font(fixed_width_font(7, 16));
        button.set_text("Go");
        assert_eq!(button.text(), Some("Go"));
    }
}
