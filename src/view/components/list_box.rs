use crate::error::UiError;
use crate::font::{BitmapFont, LINE_PITCH};
use crate::ui::{ElementId, Texture, Ui};
use crate::view::base_component::{Corner, Element, TextProps, build_text};
use crate::view::components::button::{ButtonProps, button_element};
use crate::view::components::text_box::{TextBoxProps, build_text_box};
use crate::view::{Button, Text, TextBox, Widget};
use glam::{IVec2, Vec3};
use std::rc::Rc;

/// Rows shown by the drop-down before it needs a scroll bar.
const VISIBLE_ROWS: usize = 4;

/// A drop-down list: the selected item, a toggle button, and a selectable
/// text box that opens in the list box's parent.
#[derive(Debug)]
pub struct ListBox {
    items: Vec<String>,
    font: Rc<BitmapFont>,
    caption: ElementId,
    toggle: ElementId,
    drop_down: ElementId,
    drop_down_visible: bool,
}

pub struct ListBoxProps {
    pub toggle_texture: Texture,
    pub scroll_texture: Texture,
    pub font: Rc<BitmapFont>,
    pub items: Vec<String>,
    pub selected_line: usize,
    pub size: IVec2,
    pub position: IVec2,
    pub anchor: Corner,
}

impl ListBoxProps {
    pub fn new(
        toggle_texture: Texture,
        scroll_texture: Texture,
        font: Rc<BitmapFont>,
        items: Vec<String>,
        size: IVec2,
    ) -> Self {
        Self {
            toggle_texture,
            scroll_texture,
            font,
            items,
            selected_line: 0,
            size,
            position: IVec2::ZERO,
            anchor: Corner::TopLeft,
        }
    }
}

pub fn build_list_box(ui: &mut Ui, props: ListBoxProps) -> Result<ElementId, UiError> {
    let mut toggle = ButtonProps::textured(props.toggle_texture);
    toggle.anchor = Corner::TopRight;
    let toggle = ui.insert(button_element(toggle));

    let mut drop_down_props = TextBoxProps::new(Rc::clone(&props.font), IVec2::ZERO);
    drop_down_props.scroll_texture = Some(props.scroll_texture);
    drop_down_props.allow_selection = true;
    let drop_down = build_text_box(ui, drop_down_props);
    {
        let text_box = ui.widget_mut::<TextBox>(drop_down)?;
        text_box.set_allow_scroll_bar(false);
        for item in &props.items {
            text_box.write_line(Vec3::ONE, item);
        }
        text_box.set_current_line(0);
    }

    let mut caption = TextProps::new(Rc::clone(&props.font), String::new());
    caption.anchor = Corner::TopLeft;
    let caption = build_text(ui, caption);

    let list_box = ListBox {
        items: props.items,
        font: props.font,
        caption,
        toggle,
        drop_down,
        drop_down_visible: false,
    };
    let id = ui.insert(
        Element::container(Widget::ListBox(list_box))
            .with_position(props.position)
            .with_anchor(props.anchor)
            .with_size(props.size),
    );
    ui.add_element(id, toggle)?;
    ui.add_element(id, caption)?;

    ui.element_mut(toggle)?
        .on_click(move |ui, _, _| {
            if let Err(err) = ListBox::toggle_drop_down(ui, id) {
                tracing::warn!(error = %err, "list box toggle failed");
            }
        })
        .on_lose_focus(move |ui, _, new_focus| ListBox::focus_lost(ui, id, new_focus));
    ui.element_mut(drop_down)?
        .on_lose_focus(move |ui, _, new_focus| ListBox::focus_lost(ui, id, new_focus));
    ui.element_mut(id)?
        .on_lose_focus(move |ui, _, new_focus| ListBox::focus_lost(ui, id, new_focus));
    ui.widget_mut::<TextBox>(drop_down)?
        .on_selection_changed(move |ui, _, _| ListBox::sync_caption(ui, id));

    ui.relayout(id);
    ListBox::set_selected_line(ui, id, props.selected_line)?;
    Ok(id)
}

impl ListBox {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn font(&self) -> &Rc<BitmapFont> {
        &self.font
    }

    pub fn caption(&self) -> ElementId {
        self.caption
    }

    pub fn toggle(&self) -> ElementId {
        self.toggle
    }

    /// The selectable text box holding the items.
    pub fn drop_down(&self) -> ElementId {
        self.drop_down
    }

    pub fn is_open(&self) -> bool {
        self.drop_down_visible
    }

    pub fn selected_line(ui: &Ui, id: ElementId) -> Result<Option<usize>, UiError> {
        let drop_down = ui.widget::<ListBox>(id)?.drop_down;
        Ok(ui.widget::<TextBox>(drop_down)?.selected_line())
    }

    pub fn selected_text(ui: &Ui, id: ElementId) -> Result<&str, UiError> {
        let drop_down = ui.widget::<ListBox>(id)?.drop_down;
        Ok(ui.widget::<TextBox>(drop_down)?.selected_line_text())
    }

    /// Selects an item and scrolls the drop-down so it is in view.
    pub fn set_selected_line(ui: &mut Ui, id: ElementId, line: usize) -> Result<(), UiError> {
        let drop_down = ui.widget::<ListBox>(id)?.drop_down;
        let text_box = ui.widget_mut::<TextBox>(drop_down)?;
        let last_page = text_box.line_count().saturating_sub(VISIBLE_ROWS);
        text_box.set_current_line(line.min(last_page));
        TextBox::select_line(ui, drop_down, Some(line))
    }

    fn sync_caption(ui: &mut Ui, id: ElementId) {
        let Ok(list_box) = ui.widget::<ListBox>(id) else {
            return;
        };
        let (caption, drop_down) = (list_box.caption, list_box.drop_down);
        let Ok(text) = ui
            .widget::<TextBox>(drop_down)
            .map(|text_box| text_box.selected_line_text().to_string())
        else {
            return;
        };
        if let Ok(caption) = ui.widget_mut::<Text>(caption) {
            caption.set_text(text);
        }
    }

    /// Opens or closes the drop-down below the list box.
    pub fn toggle_drop_down(ui: &mut Ui, id: ElementId) -> Result<(), UiError> {
        let list_box = ui.widget_mut::<ListBox>(id)?;
        list_box.drop_down_visible = !list_box.drop_down_visible;
        let (open, drop_down) = (list_box.drop_down_visible, list_box.drop_down);
        let scrollable = list_box.items.len() > VISIBLE_ROWS;

        if open {
            let parent = ui.element(id)?.parent().ok_or(UiError::Detached(id))?;
            ui.add_element(parent, drop_down)?;
            ui.widget_mut::<TextBox>(drop_down)?
                .set_allow_scroll_bar(scrollable);
        } else {
            ui.detach(drop_down)?;
            ui.widget_mut::<TextBox>(drop_down)?
                .set_allow_scroll_bar(false);
        }
        Ok(())
    }

    /// Closes the drop-down unless focus moved to one of the list box's
    /// own parts.
    fn focus_lost(ui: &mut Ui, id: ElementId, new_focus: Option<ElementId>) {
        let Ok(list_box) = ui.widget::<ListBox>(id) else {
            return;
        };
        let (toggle, drop_down, open) = (
            list_box.toggle,
            list_box.drop_down,
            list_box.drop_down_visible,
        );
        let scroll_bar = ui
            .widget::<TextBox>(drop_down)
            .ok()
            .and_then(TextBox::scroll_bar);
        if new_focus.is_some_and(|focus| {
            focus == toggle || focus == drop_down || Some(focus) == scroll_bar
        }) {
            return;
        }

        if open {
            if let Err(err) = ui.detach(drop_down) {
                tracing::warn!(error = %err, "closing list box failed");
            }
        }
        if let Ok(text_box) = ui.widget_mut::<TextBox>(drop_down) {
            text_box.set_allow_scroll_bar(false);
        }
        if let Ok(button) = ui.widget_mut::<Button>(toggle) {
            button.set_enabled(false);
        }
        if let Ok(list_box) = ui.widget_mut::<ListBox>(id) {
            list_box.drop_down_visible = false;
        }
    }

    /// Sizes the caption, centres the toggle and places the drop-down just
    /// past the list box, measured from the same corner.
    pub(crate) fn layout(&mut self, ui: &mut Ui, id: ElementId) {
        let Ok(element) = ui.element(id) else {
            return;
        };
        let (position, size, anchor) = (element.position(), element.size(), element.anchor());
        let Ok(toggle_size) = ui.element(self.toggle).map(Element::size) else {
            return;
        };

        if let Ok(toggle) = ui.element_mut(self.toggle) {
            toggle.core.position = IVec2::new(0, (size.y - toggle_size.y) / 2);
        }
        if let Ok(caption) = ui.element_mut(self.caption) {
            caption.core.position = IVec2::ZERO;
            caption.core.set_size(IVec2::new(size.x - toggle_size.x, size.y));
        }

        let rows = self.items.len().min(VISIBLE_ROWS) as f32;
        let height = (self.font.height() as f32 * rows * LINE_PITCH).round() as i32;
        let drop_down_size = IVec2::new(size.x - 8, height);
        let mut drop_down_position = IVec2::new(position.x, position.y + size.y);
        if anchor == Corner::Center {
            drop_down_position.y = (-size.y - drop_down_size.y) / 2;
        }
        if let Ok(drop_down) = ui.element_mut(self.drop_down) {
            drop_down.core.anchor = anchor;
            drop_down.core.position = drop_down_position;
            drop_down.core.set_size(drop_down_size);
        }
        ui.relayout(self.drop_down);
    }
}

#[cfg(test)]
mod tests {
    use super::{ListBoxProps, build_list_box};
    use crate::font::fixed_width_font;
    use crate::ui::{Click, ElementId, MouseButton, MouseState, Texture, TextureId, Ui, UiConfig};
    use crate::view::{ListBox, Text, TextBox};
    use glam::IVec2;

    fn texture(id: u32, width: u32, height: u32) -> Texture {
        Texture {
            id: TextureId(id),
            width,
            height,
        }
    }

    fn list_box(ui: &mut Ui, items: &[&str]) -> ElementId {
        let props = ListBoxProps::new(
            texture(1, 16, 16),
            texture(2, 8, 20),
            fixed_width_font(7, 16),
            items.iter().map(|item| item.to_string()).collect(),
            IVec2::new(150, 20),
        );
        let id = build_list_box(ui, props).unwrap();
        ui.add_to_root(id).unwrap();
        id
    }

    fn click(ui: &mut Ui, x: i32, y: i32) {
        ui.on_mouse_move(x, y);
        let down = Click::new(IVec2::new(x, y), Some(MouseButton::Left), MouseState::Down);
        ui.on_mouse_click(down);
        ui.on_mouse_click(Click { state: MouseState::Up, ..down });
    }

    #[test]
    fn initial_selection_fills_the_caption() {
        let mut ui = Ui::new(400, 300, UiConfig::new());
        let id = list_box(&mut ui, &["red", "green", "blue"]);
        assert_eq!(ListBox::selected_line(&ui, id).unwrap(), Some(0));
        assert_eq!(ListBox::selected_text(&ui, id).unwrap(), "red");
        let caption = ui.widget::<ListBox>(id).unwrap().caption();
        assert_eq!(ui.widget::<Text>(caption).unwrap().text(), "red");
    }

    #[test]
    fn drop_down_is_sized_for_at_most_four_rows() {
        let mut ui = Ui::new(400, 300, UiConfig::new());
        let id = list_box(&mut ui, &["a", "b", "c", "d", "e", "f"]);
        let drop_down = ui.widget::<ListBox>(id).unwrap().drop_down();
        // round(16 * 4 * 1.2) = 77
        assert_eq!(ui.element(drop_down).unwrap().size(), IVec2::new(142, 77));
        assert_eq!(ui.element(drop_down).unwrap().position(), IVec2::new(0, 20));
        assert_eq!(ui.widget::<TextBox>(drop_down).unwrap().max_lines(), 4);
    }

    #[test]
    fn toggle_opens_selection_updates_and_focus_elsewhere_closes() {
        let mut ui = Ui::new(400, 300, UiConfig::new());
        let id = list_box(&mut ui, &["red", "green", "blue"]);
        let drop_down = ui.widget::<ListBox>(id).unwrap().drop_down();

        // The 150x20 box hangs from the top left corner; the toggle is its
        // rightmost 16 pixels.
        click(&mut ui, 140, 10);
        assert!(ui.widget::<ListBox>(id).unwrap().is_open());
        assert_eq!(ui.element(drop_down).unwrap().parent(), Some(ui.root()));

        // The drop-down opens right below the box; its second row starts
        // 19.2px under its top edge.
        click(&mut ui, 10, 20 + 25);
        assert_eq!(ListBox::selected_text(&ui, id).unwrap(), "green");
        assert!(ui.widget::<ListBox>(id).unwrap().is_open());

        click(&mut ui, 300, 290);
        assert!(!ui.widget::<ListBox>(id).unwrap().is_open());
        assert!(ui.element(drop_down).unwrap().parent().is_none());
        let caption = ui.widget::<ListBox>(id).unwrap().caption();
        assert_eq!(ui.widget::<Text>(caption).unwrap().text(), "green");
    }
}
