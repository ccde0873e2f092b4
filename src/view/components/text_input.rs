use crate::error::UiError;
use crate::font::BitmapFont;
use crate::ui::{Callback, ElementId, Ui};
use crate::view::base_component::{Corner, Element, TextProps, build_text};
use crate::view::{Text, Widget};
use glam::{IVec2, Vec4};
use std::rc::Rc;

const BACKSPACE: char = '\u{8}';
const CARRIAGE_RETURN: char = '\r';
const ESCAPE: char = '\u{1b}';

/// Space kept free at the right edge; typing stops once the text reaches it.
const RIGHT_MARGIN: i32 = 16;

/// Single-line text entry. Clicking the text captures the keyboard until
/// focus moves elsewhere or escape is pressed.
#[derive(Debug)]
pub struct TextInput {
    text: ElementId,
    has_focus: bool,
    on_text_entry: Callback<String>,
    on_carriage_return: Callback<String>,
}

pub struct TextInputProps {
    pub font: Rc<BitmapFont>,
    pub text: String,
    /// Defaults to 200 pixels wide and one font height tall.
    pub size: Option<IVec2>,
    pub position: IVec2,
    pub anchor: Corner,
    pub background_color: Vec4,
}

impl TextInputProps {
    pub fn new(font: Rc<BitmapFont>) -> Self {
        Self {
            font,
            text: String::new(),
            size: None,
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            background_color: Vec4::ZERO,
        }
    }
}

pub fn build_text_input(ui: &mut Ui, props: TextInputProps) -> Result<ElementId, UiError> {
    let size = props
        .size
        .unwrap_or_else(|| IVec2::new(200, props.font.height()));

    let mut text_props = TextProps::new(props.font, props.text);
    text_props.anchor = Corner::Fill;
    text_props.padding = IVec2::new(5, 0);
    let text = build_text(ui, text_props);

    let input = TextInput {
        text,
        has_focus: false,
        on_text_entry: Callback::default(),
        on_carriage_return: Callback::default(),
    };
    let id = ui.insert(
        Element::container(Widget::TextInput(input))
            .with_position(props.position)
            .with_anchor(props.anchor)
            .with_size(size)
            .with_background_color(props.background_color),
    );
    ui.add_element(id, text)?;

    ui.element_mut(text)?
        .on_click(move |ui, _, _| {
            let Ok(input) = ui.widget_mut::<TextInput>(id) else {
                return;
            };
            if input.has_focus {
                return;
            }
            input.has_focus = true;
            ui.capture_keys(id);
        })
        .on_lose_focus(move |ui, _, _| {
            let Ok(input) = ui.widget_mut::<TextInput>(id) else {
                return;
            };
            if !input.has_focus {
                return;
            }
            input.has_focus = false;
            ui.release_keys(id);
        });
    ui.relayout(id);
    Ok(id)
}

impl TextInput {
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// The `Text` element showing the entry.
    pub fn text_element(&self) -> ElementId {
        self.text
    }

    /// Fires after every edit with the new contents.
    pub fn on_text_entry<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, String) + 'static,
    {
        self.on_text_entry.set(Box::new(handler));
    }

    pub fn on_carriage_return<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, String) + 'static,
    {
        self.on_carriage_return.set(Box::new(handler));
    }

    fn text_entry_callback(&mut self) -> &mut Callback<String> {
        &mut self.on_text_entry
    }

    fn carriage_return_callback(&mut self) -> &mut Callback<String> {
        &mut self.on_carriage_return
    }

    pub fn text(ui: &Ui, id: ElementId) -> Result<&str, UiError> {
        let text = ui.widget::<TextInput>(id)?.text;
        Ok(ui.widget::<Text>(text)?.text())
    }

    pub fn set_text(ui: &mut Ui, id: ElementId, value: impl Into<String>) -> Result<(), UiError> {
        let text = ui.widget::<TextInput>(id)?.text;
        ui.widget_mut::<Text>(text)?.set_text(value);
        Ok(())
    }

    pub fn clear(ui: &mut Ui, id: ElementId) -> Result<(), UiError> {
        TextInput::set_text(ui, id, String::new())
    }

    /// Applies one key press to an input holding the keyboard.
    pub(crate) fn handle_key(ui: &mut Ui, id: ElementId, key: char) {
        if let Err(err) = TextInput::apply_key(ui, id, key) {
            tracing::warn!(error = %err, "text input key handling failed");
        }
    }

    fn apply_key(ui: &mut Ui, id: ElementId, key: char) -> Result<(), UiError> {
        let text_id = ui.widget::<TextInput>(id)?.text;
        match key {
            BACKSPACE => {
                let text = ui.widget_mut::<Text>(text_id)?;
                let mut value = text.text().to_string();
                if value.pop().is_none() {
                    return Ok(());
                }
                text.set_text(value.clone());
                ui.emit(id, TextInput::text_entry_callback, value);
            }
            CARRIAGE_RETURN => {
                let value = ui.widget::<Text>(text_id)?.text().to_string();
                ui.emit(id, TextInput::carriage_return_callback, value);
            }
            ESCAPE => ui.fire_lose_focus(text_id, None),
            key if key.is_control() => {}
            key => {
                let width = ui.element(id)?.size().x;
                let text = ui.widget_mut::<Text>(text_id)?;
                if text.text_size().x > width - RIGHT_MARGIN {
                    return Ok(());
                }
                let mut value = text.text().to_string();
                value.push(key);
                text.set_text(value.clone());
                ui.emit(id, TextInput::text_entry_callback, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{TextInputProps, build_text_input};
    use crate::font::fixed_width_font;
    use crate::ui::{Click, ElementId, MouseButton, MouseState, Ui, UiConfig};
    use crate::view::TextInput;
    use glam::IVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn focused_input(ui: &mut Ui, width: i32) -> ElementId {
        let mut props = TextInputProps::new(fixed_width_font(7, 16));
        props.size = Some(IVec2::new(width, 16));
        let id = build_text_input(ui, props).unwrap();
        ui.add_to_root(id).unwrap();
        ui.on_mouse_move(10, 195);
        ui.on_mouse_click(Click::new(
            IVec2::new(10, 195),
            Some(MouseButton::Left),
            MouseState::Down,
        ));
        id
    }

    #[test]
    fn keys_are_ignored_until_the_text_is_clicked() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let id = build_text_input(&mut ui, TextInputProps::new(fixed_width_font(7, 16))).unwrap();
        ui.add_to_root(id).unwrap();
        assert!(!ui.on_key_down('a'));
        assert_eq!(TextInput::text(&ui, id).unwrap(), "");
    }

    #[test]
    fn typing_editing_and_submitting() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let id = focused_input(&mut ui, 200);
        assert!(ui.widget::<TextInput>(id).unwrap().has_focus());
        assert_eq!(ui.key_capture(), Some(id));

        let entries = Rc::new(RefCell::new(Vec::new()));
        let submitted = Rc::new(RefCell::new(Vec::new()));
        let (entry_sink, submit_sink) = (Rc::clone(&entries), Rc::clone(&submitted));
        let input = ui.widget_mut::<TextInput>(id).unwrap();
        input.on_text_entry(move |_, _, text| entry_sink.borrow_mut().push(text));
        input.on_carriage_return(move |_, _, text| submit_sink.borrow_mut().push(text));

        for key in ['h', 'i', '\u{8}', 'o', '\t', '\r'] {
            assert!(ui.on_key_down(key));
        }
        assert_eq!(*entries.borrow(), ["h", "hi", "h", "ho"]);
        assert_eq!(*submitted.borrow(), ["ho"]);
        assert_eq!(TextInput::text(&ui, id).unwrap(), "ho");
    }

    #[test]
    fn input_stops_at_the_right_margin() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        // 40 - 16 = 24px of room: typing stops once the text is wider than that.
        let id = focused_input(&mut ui, 40);
        for _ in 0..10 {
            ui.on_key_down('x');
        }
        assert_eq!(TextInput::text(&ui, id).unwrap(), "xxxx");
    }

    #[test]
    fn escape_and_clicking_elsewhere_release_the_keyboard() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let id = focused_input(&mut ui, 200);
        assert!(ui.on_key_down('\u{1b}'));
        assert!(!ui.widget::<TextInput>(id).unwrap().has_focus());
        assert!(!ui.on_key_down('a'));

        ui.on_mouse_click(Click::new(

            IVec2::new(10, 195),

            Some(MouseButton::Left),

            MouseState::Up,

        ));
        ui.on_mouse_click(Click::new(
            IVec2::new(10, 195),
            Some(MouseButton::Left),
            MouseState::Down,
        ));
        assert_eq!(ui.key_capture(), Some(id));
        ui.on_mouse_move(100, 100);
        ui.on_mouse_click(Click::new(
            IVec2::new(100, 100),
            Some(MouseButton::Left),
            MouseState::Down,
        ));
        assert_eq!(ui.key_capture(), None);
    }
}
