use crate::error::UiError;
use crate::font::BitmapFont;
use crate::ui::{Callback, ElementId, Texture, Ui};
use crate::view::base_component::{Corner, Element, TextProps, build_text};
use crate::view::components::button::{ButtonProps, button_element};
use crate::view::{Text, Widget};
use glam::IVec2;
use std::rc::Rc;

/// Gap between the box and its caption.
const CAPTION_GAP: i32 = 6;

/// A textured toggle box with an optional caption to its right.
#[derive(Debug)]
pub struct CheckBox {
    checked: bool,
    unchecked_texture: Texture,
    checked_texture: Texture,
    button: ElementId,
    caption: Option<ElementId>,
    on_checked_changed: Callback<bool>,
}

pub struct CheckBoxProps {
    pub unchecked_texture: Texture,
    pub checked_texture: Texture,
    pub caption: Option<(Rc<BitmapFont>, String)>,
    pub position: IVec2,
    pub anchor: Corner,
    pub checked: bool,
}

impl CheckBoxProps {
    pub fn new(unchecked_texture: Texture, checked_texture: Texture) -> Self {
        Self {
            unchecked_texture,
            checked_texture,
            caption: None,
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            checked: false,
        }
    }

    pub fn with_caption(mut self, font: Rc<BitmapFont>, text: impl Into<String>) -> Self {
        self.caption = Some((font, text.into()));
        self
    }
}

pub fn build_checkbox(ui: &mut Ui, props: CheckBoxProps) -> Result<ElementId, UiError> {
    let initial = if props.checked {
        props.checked_texture
    } else {
        props.unchecked_texture
    };
    let mut button = ButtonProps::textured(initial);
    button.anchor = Corner::BottomLeft;
    let button = ui.insert(button_element(button));

    let caption = match props.caption {
        Some((font, text)) => Some(build_text(ui, TextProps::new(font, text))),
        None => None,
    };

    let check_box = CheckBox {
        checked: props.checked,
        unchecked_texture: props.unchecked_texture,
        checked_texture: props.checked_texture,
        button,
        caption,
        on_checked_changed: Callback::default(),
    };
    let id = ui.insert(
        Element::container(Widget::CheckBox(check_box))
            .with_position(props.position)
            .with_anchor(props.anchor)
            .with_size(props.unchecked_texture.size()),
    );

    ui.add_element(id, button)?;
    if let Some(caption) = caption {
        ui.add_element(id, caption)?;
    }
    ui.element_mut(button)?.on_click(move |ui, _, _| {
        if let Err(err) = CheckBox::toggle(ui, id) {
            tracing::warn!(error = %err, "check box toggle failed");
        }
    });
    ui.relayout(id);
    Ok(id)
}

impl CheckBox {
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn button(&self) -> ElementId {
        self.button
    }

    pub fn caption(&self) -> Option<ElementId> {
        self.caption
    }

    pub fn on_checked_changed<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, bool) + 'static,
    {
        self.on_checked_changed.set(Box::new(handler));
    }

    fn checked_changed_callback(&mut self) -> &mut Callback<bool> {
        &mut self.on_checked_changed
    }

    /// Assigns the state, swaps the box texture and notifies the listener.
    /// The listener fires on every assignment, changed or not.
    pub fn set_checked(ui: &mut Ui, id: ElementId, checked: bool) -> Result<(), UiError> {
        let check_box = ui.widget_mut::<CheckBox>(id)?;
        check_box.checked = checked;
        let texture = if checked {
            check_box.checked_texture
        } else {
            check_box.unchecked_texture
        };
        let button = check_box.button;
        ui.emit(id, CheckBox::checked_changed_callback, checked);
        ui.set_background_texture(button, Some(texture))
    }

    pub fn toggle(ui: &mut Ui, id: ElementId) -> Result<(), UiError> {
        let checked = ui.widget::<CheckBox>(id)?.checked;
        CheckBox::set_checked(ui, id, !checked)
    }

    /// Places the caption to the right of the box, vertically centred.
    pub(crate) fn layout(&mut self, ui: &mut Ui, id: ElementId) {
        let Some(caption) = self.caption else {
            return;
        };
        let Ok(height) = ui.element(id).map(Element::size).map(|size| size.y) else {
            return;
        };
        let Ok(text_height) = ui.widget::<Text>(caption).map(|text| text.text_size().y) else {
            return;
        };
        if let Ok(element) = ui.element_mut(caption) {
            element.core.position = IVec2::new(
                self.unchecked_texture.size().x + CAPTION_GAP,
                height / 2 - text_height / 2,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckBoxProps, build_checkbox};
    use crate::font::fixed_width_font;
    use crate::ui::{Click, MouseButton, MouseState, Texture, TextureId, Ui, UiConfig};
    use crate::view::CheckBox;
    use glam::IVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn texture(id: u32) -> Texture {
        Texture {
            id: TextureId(id),
            width: 20,
            height: 20,
        }
    }

    #[test]
    fn clicking_the_box_toggles_and_swaps_texture() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let id = build_checkbox(
            &mut ui,
            CheckBoxProps::new(texture(1), texture(2)).with_caption(fixed_width_font(7, 16), "Fog"),
        )
        .unwrap();
        ui.add_to_root(id).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        ui.widget_mut::<CheckBox>(id)
            .unwrap()
            .on_checked_changed(move |_, _, checked| sink.borrow_mut().push(checked));

        ui.on_mouse_move(5, 195);
        let down = Click::new(IVec2::new(5, 195), Some(MouseButton::Left), MouseState::Down);
        ui.on_mouse_click(down);
        ui.on_mouse_click(Click { state: MouseState::Up, ..down });

        let check_box = ui.widget::<CheckBox>(id).unwrap();
        assert!(check_box.is_checked());
        let button = check_box.button();
        assert_eq!(
            ui.element(button).unwrap().background_texture(),
            Some(texture(2))
        );
        assert_eq!(*changes.borrow(), [true]);
    }

    #[test]
    fn caption_sits_right_of_the_box() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let id = build_checkbox(
            &mut ui,
            CheckBoxProps::new(texture(1), texture(2)).with_caption(fixed_width_font(7, 10), "Fog"),
        )
        .unwrap();
        ui.add_to_root(id).unwrap();
        let caption = ui.widget::<CheckBox>(id).unwrap().caption().unwrap();
        assert_eq!(ui.element(caption).unwrap().position(), IVec2::new(26, 5));
    }

    #[test]
    fn assignment_notifies_even_without_change() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let id = build_checkbox(&mut ui, CheckBoxProps::new(texture(1), texture(2))).unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        ui.widget_mut::<CheckBox>(id)
            .unwrap()
            .on_checked_changed(move |_, _, _| *sink.borrow_mut() += 1);
        CheckBox::set_checked(&mut ui, id, false).unwrap();
        CheckBox::set_checked(&mut ui, id, false).unwrap();
        assert_eq!(*count.borrow(), 2);
    }
}
