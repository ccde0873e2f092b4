use crate::error::UiError;
use crate::font::{BitmapFont, Justification, LINE_PITCH};
use crate::ui::{Callback, ElementId, Texture, Ui};
use crate::view::base_component::{Corner, Element, TextProps, build_text};
use crate::view::components::text_box::{TextBoxProps, build_text_box};
use crate::view::{Text, TextBox, Widget};
use glam::{IVec2, Vec3};
use std::rc::Rc;

const X_PADDING: i32 = 50;
const Y_TOP: i32 = 90;
const Y_BOTTOM: i32 = 50;
const MAX_RESPONSES: usize = 3;
const RESPONSE_WIDTH: i32 = 200;

/// A textured panel with a speaker title, a typewriter text box and up to
/// three selectable responses that appear once the text is fully shown.
#[derive(Debug)]
pub struct DialogBox {
    title: ElementId,
    text_box: ElementId,
    responses: Vec<String>,
    response_box: Option<ElementId>,
    on_selection_picked: Callback<Option<usize>>,
}

pub struct DialogBoxProps {
    pub title_font: Rc<BitmapFont>,
    pub contents_font: Rc<BitmapFont>,
    /// Background; also decides the dialog's size.
    pub texture: Texture,
    pub position: IVec2,
    pub anchor: Corner,
    pub time_per_character: f32,
}

impl DialogBoxProps {
    pub fn new(
        title_font: Rc<BitmapFont>,
        contents_font: Rc<BitmapFont>,
        texture: Texture,
    ) -> Self {
        Self {
            title_font,
            contents_font,
            texture,
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            time_per_character: 0.0,
        }
    }
}

pub fn build_dialog_box(ui: &mut Ui, props: DialogBoxProps) -> Result<ElementId, UiError> {
    let mut title = TextProps::new(props.title_font, String::new());
    title.anchor = Corner::TopLeft;
    title.justification = Justification::Center;
    let title = build_text(ui, title);

    let mut contents = TextBoxProps::new(props.contents_font, IVec2::ZERO);
    contents.anchor = Corner::TopLeft;
    contents.time_per_character = props.time_per_character;
    let text_box = build_text_box(ui, contents);

    let dialog = DialogBox {
        title,
        text_box,
        responses: Vec::new(),
        response_box: None,
        on_selection_picked: Callback::default(),
    };
    let id = ui.insert(
        Element::container(Widget::DialogBox(dialog))
            .with_position(props.position)
            .with_anchor(props.anchor)
            .with_size(props.texture.size())
            .with_background_texture(props.texture),
    );
    ui.add_element(id, title)?;
    ui.add_element(id, text_box)?;

    ui.element_mut(text_box)?.on_click(move |ui, text_box, _| {
        let shown = ui
            .widget::<TextBox>(text_box)
            .is_ok_and(TextBox::text_is_visible);
        if !shown {
            if let Ok(text_box) = ui.widget_mut::<TextBox>(text_box) {
                text_box.set_text_visible(true);
            }
        } else if let Ok(response) = DialogBox::response(ui, id) {
            ui.emit(id, DialogBox::selection_picked_callback, response);
        }
    });
    ui.relayout(id);
    Ok(id)
}

impl DialogBox {
    /// The text box holding the dialog's contents.
    pub fn text_box(&self) -> ElementId {
        self.text_box
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    /// Name of whoever is speaking.
    pub fn title(ui: &Ui, id: ElementId) -> Result<&str, UiError> {
        let title = ui.widget::<DialogBox>(id)?.title;
        Ok(ui.widget::<Text>(title)?.text())
    }

    pub fn set_title(ui: &mut Ui, id: ElementId, title: impl Into<String>) -> Result<(), UiError> {
        let title_id = ui.widget::<DialogBox>(id)?.title;
        ui.widget_mut::<Text>(title_id)?.set_text(title);
        Ok(())
    }

    pub fn on_selection_picked<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, Option<usize>) + 'static,
    {
        self.on_selection_picked.set(Box::new(handler));
    }

    fn selection_picked_callback(&mut self) -> &mut Callback<Option<usize>> {
        &mut self.on_selection_picked
    }

    /// Index of the chosen response, or `None` when there are no responses.
    pub fn response(ui: &Ui, id: ElementId) -> Result<Option<usize>, UiError> {
        let dialog = ui.widget::<DialogBox>(id)?;
        match dialog.response_box.filter(|_| !dialog.responses.is_empty()) {
            Some(response_box) => Ok(ui.widget::<TextBox>(response_box)?.selected_line()),
            None => Ok(None),
        }
    }

    pub fn response_text(ui: &Ui, id: ElementId) -> Result<&str, UiError> {
        match ui.widget::<DialogBox>(id)?.response_box {
            Some(response_box) => Ok(ui.widget::<TextBox>(response_box)?.selected_line_text()),
            None => Ok(""),
        }
    }

    /// Replaces the responses. They are hidden until the contents have been
    /// fully revealed; an empty list removes them.
    pub fn set_responses(
        ui: &mut Ui,
        id: ElementId,
        responses: Vec<String>,
    ) -> Result<(), UiError> {
        if responses.len() > MAX_RESPONSES {
            return Err(UiError::TooManyResponses(responses.len()));
        }
        let dialog = ui.widget::<DialogBox>(id)?;
        let (text_box, existing) = (dialog.text_box, dialog.response_box);
        let response_box = match existing {
            Some(response_box) => {
                ui.detach(response_box)?;
                response_box
            }
            None => {
                let font = Rc::clone(ui.widget::<TextBox>(text_box)?.font());
                let mut props = TextBoxProps::new(font, IVec2::ZERO);
                props.anchor = Corner::TopRight;
                props.allow_selection = true;
                let response_box = build_text_box(ui, props);
                ui.widget_mut::<DialogBox>(id)?.response_box = Some(response_box);
                response_box
            }
        };

        let count = responses.len();
        let response_box_state = ui.widget_mut::<TextBox>(response_box)?;
        response_box_state.clear();
        for response in &responses {
            response_box_state.write_line(Vec3::ONE, response);
        }
        response_box_state.set_current_line(0);
        let font_height = response_box_state.font().height();
        ui.widget_mut::<DialogBox>(id)?.responses = responses;
        if count == 0 {
            ui.widget_mut::<TextBox>(text_box)?.clear_on_text_visible();
            return Ok(());
        }

        let height = (font_height as f32 * count as f32 * LINE_PITCH) as i32;
        ui.set_size(response_box, IVec2::new(RESPONSE_WIDTH, height))?;
        TextBox::select_line(ui, response_box, Some(0))?;

        ui.widget_mut::<TextBox>(text_box)?
            .on_text_visible(move |ui, text_box, ()| {
                if let Ok(state) = ui.widget_mut::<TextBox>(text_box) {
                    state.clear_on_text_visible();
                }
                if let Err(err) = ui.add_element(id, response_box) {
                    tracing::warn!(error = %err, "showing dialog responses failed");
                }
            });
        Ok(())
    }

    /// Clears the contents and drops any responses.
    pub fn clear(ui: &mut Ui, id: ElementId) -> Result<(), UiError> {
        let dialog = ui.widget::<DialogBox>(id)?;
        let (text_box, has_responses) = (dialog.text_box, !dialog.responses.is_empty());
        ui.widget_mut::<TextBox>(text_box)?.clear();
        if has_responses {
            DialogBox::set_responses(ui, id, Vec::new())?;
        }
        Ok(())
    }

    pub fn write(
        ui: &mut Ui,
        id: ElementId,
        color: impl Into<Vec3>,
        text: &str,
    ) -> Result<(), UiError> {
        let text_box = ui.widget::<DialogBox>(id)?.text_box;
        ui.widget_mut::<TextBox>(text_box)?.write(color, text);
        Ok(())
    }

    pub fn write_line(
        ui: &mut Ui,
        id: ElementId,
        color: impl Into<Vec3>,
        text: &str,
    ) -> Result<(), UiError> {
        let text_box = ui.widget::<DialogBox>(id)?.text_box;
        ui.widget_mut::<TextBox>(text_box)?.write_line(color, text);
        Ok(())
    }

    pub(crate) fn owned_elements(&self) -> Option<ElementId> {
        self.response_box
    }

    pub(crate) fn layout(&mut self, ui: &mut Ui, id: ElementId) {
        let Ok(size) = ui.element(id).map(Element::size) else {
            return;
        };
        if let Ok(title) = ui.element_mut(self.title) {
            title.core.position = IVec2::new(X_PADDING + 100, Y_TOP - 35);
        }
        if let Ok(text_box) = ui.element_mut(self.text_box) {
            text_box.core.position = IVec2::new(X_PADDING, Y_TOP);
            text_box
                .core
                .set_size(IVec2::new(size.x - X_PADDING * 2, size.y - Y_TOP - Y_BOTTOM));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DialogBoxProps, build_dialog_box};
    use crate::error::UiError;
    use crate::font::fixed_width_font;
    use crate::render::RecordingRenderer;
    use crate::ui::{Click, ElementId, MouseButton, MouseState, Texture, TextureId, Ui, UiConfig};
    use crate::view::{DialogBox, TextBox};
    use glam::{IVec2, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dialog(ui: &mut Ui, time_per_character: f32) -> ElementId {
        let texture = Texture {
            id: TextureId(4),
            width: 600,
            height: 200,
        };
        let mut props =
            DialogBoxProps::new(fixed_width_font(7, 16), fixed_width_font(7, 16), texture);
        props.time_per_character = time_per_character;
        let id = build_dialog_box(ui, props).unwrap();
        ui.add_to_root(id).unwrap();
        id
    }

    fn responses(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn contents_fill_the_padded_panel() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = dialog(&mut ui, 0.0);
        let text_box = ui.widget::<DialogBox>(id).unwrap().text_box();
        let element = ui.element(text_box).unwrap();
        assert_eq!(element.size(), IVec2::new(500, 60));
        // Measured from the dialog's top left corner.
        assert_eq!(element.corrected_position(), IVec2::new(50, 50));

        DialogBox::set_title(&mut ui, id, "Guard").unwrap();
        assert_eq!(DialogBox::title(&ui, id).unwrap(), "Guard");
    }

    #[test]
    fn more_than_three_responses_are_rejected() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = dialog(&mut ui, 0.0);
        let result = DialogBox::set_responses(&mut ui, id, responses(&["a", "b", "c", "d"]));
        assert!(matches!(result, Err(UiError::TooManyResponses(4))));
        assert_eq!(DialogBox::response(&ui, id).unwrap(), None);
        assert_eq!(DialogBox::response_text(&ui, id).unwrap(), "");
    }

    #[test]
    fn responses_appear_once_the_text_is_visible() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = dialog(&mut ui, 0.0);
        ui.write_line(id, "Halt! Who goes there?").unwrap();
        DialogBox::set_responses(&mut ui, id, responses(&["A friend", "Nobody"])).unwrap();

        let response_box = ui.widget::<DialogBox>(id).unwrap().owned_elements().unwrap();
        assert!(ui.element(response_box).unwrap().parent().is_none());
        assert_eq!(ui.element(response_box).unwrap().size(), IVec2::new(200, 38));

        let mut renderer = RecordingRenderer::new();
        ui.draw(&mut renderer).unwrap();
        assert_eq!(ui.element(response_box).unwrap().parent(), Some(id));
        assert_eq!(DialogBox::response(&ui, id).unwrap(), Some(0));
        assert_eq!(DialogBox::response_text(&ui, id).unwrap(), "A friend");

        DialogBox::clear(&mut ui, id).unwrap();
        assert!(ui.element(response_box).unwrap().parent().is_none());
        assert_eq!(DialogBox::response(&ui, id).unwrap(), None);
    }

    #[test]
    fn first_click_reveals_and_second_click_picks() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = dialog(&mut ui, 0.05);
        DialogBox::write_line(&mut ui, id, Vec3::ONE, "Choose wisely.").unwrap();
        DialogBox::set_responses(&mut ui, id, responses(&["Left", "Right"])).unwrap();

        let picked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&picked);
        ui.widget_mut::<DialogBox>(id)
            .unwrap()
            .on_selection_picked(move |_, _, response| sink.borrow_mut().push(response));

        let text_box = ui.widget::<DialogBox>(id).unwrap().text_box();
        assert!(!ui.widget::<TextBox>(text_box).unwrap().text_is_visible());

        // The text box spans x 50..550 and platform y 490..550.
        let click = |ui: &mut Ui| {
            ui.on_mouse_move(100, 520);
            let down = Click::new(IVec2::new(100, 520), Some(MouseButton::Left), MouseState::Down);
            ui.on_mouse_click(down);
            ui.on_mouse_click(Click { state: MouseState::Up, ..down });
        };
        click(&mut ui);
        assert!(ui.widget::<TextBox>(text_box).unwrap().text_is_visible());
        assert!(picked.borrow().is_empty());

        click(&mut ui);
        assert_eq!(*picked.borrow(), vec![Some(0)]);
    }
}
