use crate::ui::{Click, ElementId, MouseEvent, MouseSlot, MouseState, Ui};
use crate::view::{TextInput, Widget};
use glam::IVec2;

impl Ui {
    /// Deepest visible, pickable element under `point` (UI coordinates).
    /// Later siblings are on top. Returns the root when nothing else is hit.
    pub fn pick(&self, point: IVec2) -> ElementId {
        let inside = self
            .elements
            .get(self.root)
            .is_some_and(|root| root.pick(point));
        if !inside {
            return self.root;
        }
        self.pick_children(self.root, point).unwrap_or(self.root)
    }

    fn pick_children(&self, container: ElementId, point: IVec2) -> Option<ElementId> {
        let element = self.elements.get(container)?;
        for &child in element.children().iter().rev() {
            let Some(candidate) = self.elements.get(child) else {
                continue;
            };
            if !candidate.pick(point) {
                continue;
            }
            if candidate.is_container() {
                return Some(self.pick_children(child, point).unwrap_or(child));
            }
            return Some(child);
        }
        None
    }

    fn mouse_event(&self) -> MouseEvent {
        let mouse = self.pointer.mouse;
        MouseEvent {
            location: mouse.position,
            last_location: self.pointer.last_mouse.position,
            ui_location: IVec2::new(mouse.position.x, self.viewport.y - mouse.position.y),
            button: mouse.button,
            state: mouse.state,
        }
    }

    /// Feeds a pointer move in platform coordinates (origin top-left).
    /// Returns whether the pointer is over an element.
    pub fn on_mouse_move(&mut self, x: i32, y: i32) -> bool {
        if !self.visible {
            return false;
        }
        self.pointer.last_mouse = self.pointer.mouse;
        self.pointer.mouse = Click::new(IVec2::new(x, y), None, MouseState::Up);
        let event = self.mouse_event();

        if let Some(current) = self.pointer.current {
            self.fire_mouse(current, MouseSlot::Move, &event);
        }

        let hit = self.pick(event.ui_location);
        let selection = (hit != self.root).then_some(hit);
        if selection != self.pointer.selection {
            if let Some(previous) = self.pointer.current {
                self.fire_mouse(previous, MouseSlot::Leave, &event);
            }
            self.pointer.selection = selection;
            self.pointer.current = selection;
            if let Some(current) = selection {
                self.fire_mouse(current, MouseSlot::Enter, &event);
            }
        }
        self.pointer.current.is_some()
    }

    /// Feeds a button transition. Returns whether an element is active
    /// (holding a button down) afterwards.
    pub fn on_mouse_click(&mut self, click: Click) -> bool {
        if !self.visible {
            return false;
        }
        self.pointer.last_mouse = self.pointer.mouse;
        self.pointer.mouse = click;
        let event = self.mouse_event();
        let current = self.pointer.current;

        if click.state == MouseState::Down && self.pointer.focus != current {
            if let Some(previous) = self.pointer.focus {
                self.fire_lose_focus(previous, current);
            }
            self.pointer.focus = current;
        }

        if let (Some(active), MouseState::Up) = (self.pointer.active, click.state) {
            self.fire_mouse(active, MouseSlot::Up, &event);
            self.pointer.active = None;
        } else if let Some(current) = current.filter(|id| {
            self.elements
                .get(*id)
                .is_some_and(|element| !element.is_container())
        }) {
            match click.state {
                MouseState::Down => {
                    self.fire_mouse(current, MouseSlot::Down, &event);
                    self.pointer.active = Some(current);
                }
                MouseState::Up => {
                    self.fire_mouse(current, MouseSlot::Up, &event);
                    self.pointer.active = None;
                }
            }
            self.fire_mouse(current, MouseSlot::Click, &event);
        }
        tracing::trace!(?click, active = ?self.pointer.active, "mouse click");
        self.pointer.active.is_some()
    }

    /// Fires the repeat handler of the active element, if any. Hosts call
    /// this while a button is held.
    pub fn on_mouse_repeat(&mut self) -> bool {
        let Some(active) = self.pointer.active else {
            return false;
        };
        let event = self.mouse_event();
        self.fire_mouse(active, MouseSlot::Repeat, &event);
        true
    }

    /// Routes a key press to the text input that captured the keyboard.
    /// Returns `false` when no input holds the keyboard.
    pub fn on_key_down(&mut self, key: char) -> bool {
        let Some(&target) = self.key_capture.last() else {
            return false;
        };
        if !matches!(
            self.elements.get(target).map(|element| &element.widget),
            Some(Widget::TextInput(_))
        ) {
            self.key_capture.retain(|captured| *captured != target);
            return false;
        }
        TextInput::handle_key(self, target, key);
        true
    }

    /// Element currently holding the keyboard.
    pub fn key_capture(&self) -> Option<ElementId> {
        self.key_capture.last().copied()
    }

    pub(crate) fn capture_keys(&mut self, id: ElementId) {
        self.key_capture.retain(|captured| *captured != id);
        self.key_capture.push(id);
    }

    pub(crate) fn release_keys(&mut self, id: ElementId) {
        self.key_capture.retain(|captured| *captured != id);
    }
}

#[cfg(test)]
mod tests {
    use crate::ui::{Click, ElementId, MouseButton, MouseEvent, MouseSlot, MouseState, Ui, UiConfig};
    use crate::view::{Element, Widget};
    use glam::IVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(log: &Log, tag: String) -> impl FnMut(&mut Ui, ElementId, &MouseEvent) + 'static {
        let log = Rc::clone(log);
        move |_: &mut Ui, _: ElementId, _: &MouseEvent| log.borrow_mut().push(tag.clone())
    }

    fn logged_leaf(ui: &mut Ui, log: &Log, name: &str, position: IVec2, size: IVec2) -> ElementId {
        let mut element = Element::leaf(Widget::Panel)
            .with_name(name)
            .with_position(position)
            .with_size(size);
        element
            .on_mouse_down(record(log, format!("down:{name}")))
            .on_mouse_up(record(log, format!("up:{name}")))
            .on_click(record(log, format!("click:{name}")))
            .on_mouse_enter(record(log, format!("enter:{name}")))
            .on_mouse_leave(record(log, format!("leave:{name}")));
        let focus_log = Rc::clone(log);
        let tag = format!("lose_focus:{name}");
        element.on_lose_focus(move |_, _, _| focus_log.borrow_mut().push(tag.clone()));
        let id = ui.insert(element);
        ui.add_to_root(id).unwrap();
        id
    }

    fn press(state: MouseState) -> Click {
        Click::new(IVec2::ZERO, Some(MouseButton::Left), state)
    }

    #[test]
    fn later_sibling_wins_and_unpickable_elements_are_skipped() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let log = Log::default();
        let below = logged_leaf(&mut ui, &log, "below", IVec2::ZERO, IVec2::splat(100));
        let above = logged_leaf(&mut ui, &log, "above", IVec2::splat(50), IVec2::splat(100));

        assert_eq!(ui.pick(IVec2::splat(60)), above);
        assert_eq!(ui.pick(IVec2::splat(10)), below);
        assert_eq!(ui.pick(IVec2::splat(190)), ui.root());

        // Hidden elements are still hit-tested.
        ui.set_visible(above, false).unwrap();
        assert_eq!(ui.pick(IVec2::splat(60)), above);
        ui.set_disable_picking(above, true).unwrap();
        assert_eq!(ui.pick(IVec2::splat(60)), below);
    }

    #[test]
    fn picking_descends_into_containers() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let panel = ui.insert(Element::panel().with_size(IVec2::splat(100)));
        ui.add_to_root(panel).unwrap();
        let inner = ui.insert(
            Element::leaf(Widget::Panel)
                .with_position(IVec2::splat(10))
                .with_size(IVec2::splat(20)),
        );
        ui.add_element(panel, inner).unwrap();

        assert_eq!(ui.pick(IVec2::splat(15)), inner);
        assert_eq!(ui.pick(IVec2::splat(80)), panel);
    }

    #[test]
    fn move_converts_to_bottom_left_origin_and_tracks_enter_leave() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let log = Log::default();
        let id = logged_leaf(&mut ui, &log, "a", IVec2::ZERO, IVec2::splat(50));

        // y = 190 from the top is y = 10 from the bottom.
        assert!(ui.on_mouse_move(10, 190));
        assert_eq!(ui.current_selection(), Some(id));
        assert!(!ui.on_mouse_move(10, 10));
        assert_eq!(ui.current_selection(), None);
        assert_eq!(*log.borrow(), ["enter:a", "leave:a"]);
    }

    #[test]
    fn down_up_on_a_leaf_fires_in_order_and_moves_focus() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let log = Log::default();
        let first = logged_leaf(&mut ui, &log, "first", IVec2::ZERO, IVec2::splat(50));
        let second = logged_leaf(&mut ui, &log, "second", IVec2::new(100, 0), IVec2::splat(50));

        ui.on_mouse_move(10, 190);
        assert!(ui.on_mouse_click(press(MouseState::Down)));
        assert_eq!(ui.active_selection(), Some(first));
        assert_eq!(ui.focus(), Some(first));
        assert!(!ui.on_mouse_click(press(MouseState::Up)));
        assert_eq!(ui.active_selection(), None);

        ui.on_mouse_move(110, 190);
        ui.on_mouse_click(press(MouseState::Down));
        assert_eq!(ui.focus(), Some(second));
        assert_eq!(
            *log.borrow(),
            [
                "enter:first",
                "down:first",
                "click:first",
                "up:first",
                "leave:first",
                "enter:second",
                "lose_focus:first",
                "down:second",
                "click:second",
            ]
        );
    }

    #[test]
    fn release_elsewhere_goes_to_the_active_element() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let log = Log::default();
        let first = logged_leaf(&mut ui, &log, "first", IVec2::ZERO, IVec2::splat(50));
        logged_leaf(&mut ui, &log, "second", IVec2::new(100, 0), IVec2::splat(50));

        ui.on_mouse_move(10, 190);
        ui.on_mouse_click(press(MouseState::Down));
        ui.on_mouse_move(110, 190);
        log.borrow_mut().clear();
        ui.on_mouse_click(press(MouseState::Up));

        assert_eq!(*log.borrow(), ["up:first"]);
        assert_eq!(ui.active_selection(), None);
        assert_eq!(ui.focus(), Some(first));
    }

    #[test]
    fn containers_take_focus_but_never_activate() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let panel = ui.insert(Element::panel().with_size(IVec2::splat(100)));
        ui.add_to_root(panel).unwrap();

        ui.on_mouse_move(10, 190);
        assert_eq!(ui.current_selection(), Some(panel));
        assert!(!ui.on_mouse_click(press(MouseState::Down)));
        assert_eq!(ui.focus(), Some(panel));
        assert_eq!(ui.active_selection(), None);
    }

    #[test]
    fn handler_may_clear_its_own_slot() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let mut element = Element::leaf(Widget::Panel).with_size(IVec2::splat(50));
        element.on_click(move |ui, id, _| {
            *counter.borrow_mut() += 1;
            ui.element_mut(id)
                .unwrap()
                .clear_handler(MouseSlot::Click);
        });
        let id = ui.insert(element);
        ui.add_to_root(id).unwrap();

        ui.on_mouse_move(10, 190);
        ui.on_mouse_click(press(MouseState::Down));
        ui.on_mouse_click(press(MouseState::Up));
        ui.on_mouse_click(press(MouseState::Down));
        assert_eq!(*hits.borrow(), 1);
        assert!(!ui.element(id).unwrap().has_handler(MouseSlot::Click));
    }

    #[test]
    fn hidden_ui_ignores_input() {
        let mut ui = Ui::new(200, 200, UiConfig::new());
        let log = Log::default();
        logged_leaf(&mut ui, &log, "a", IVec2::ZERO, IVec2::splat(50));
        ui.set_ui_visible(false);
        assert!(!ui.on_mouse_move(10, 190));
        assert!(log.borrow().is_empty());
    }
}
