use crate::ui::{ElementId, Ui};
use glam::IVec2;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseState {
    #[default]
    Up,
    Down,
}

/// One pointer sample as delivered by the platform layer (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Click {
    pub position: IVec2,
    pub button: Option<MouseButton>,
    pub state: MouseState,
}

impl Click {
    pub fn new(position: IVec2, button: Option<MouseButton>, state: MouseState) -> Self {
        Self {
            position,
            button,
            state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Pointer position in platform coordinates (origin top-left).
    pub location: IVec2,
    pub last_location: IVec2,
    /// Pointer position in UI coordinates (origin bottom-left).
    pub ui_location: IVec2,
    pub button: Option<MouseButton>,
    pub state: MouseState,
}

impl MouseEvent {
    pub fn is_left(&self) -> bool {
        self.button == Some(MouseButton::Left)
    }
}

/// A single-subscriber callback slot. Assigning replaces the previous
/// handler. While a handler runs it is taken out of its slot, so a handler
/// may reassign or clear its own slot.
pub struct Slot<H: ?Sized> {
    handler: Option<Box<H>>,
    generation: u32,
}

impl<H: ?Sized> Slot<H> {
    pub fn set(&mut self, handler: Box<H>) {
        self.handler = Some(handler);
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.handler = None;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_set(&self) -> bool {
        self.handler.is_some()
    }

    pub(crate) fn take(&mut self) -> Option<(Box<H>, u32)> {
        self.handler.take().map(|handler| (handler, self.generation))
    }

    /// Puts a handler back unless the slot was reassigned while it ran.
    pub(crate) fn restore(&mut self, handler: Box<H>, generation: u32) {
        if self.generation == generation && self.handler.is_none() {
            self.handler = Some(handler);
        }
    }
}

impl<H: ?Sized> Default for Slot<H> {
    fn default() -> Self {
        Self {
            handler: None,
            generation: 0,
        }
    }
}

impl<H: ?Sized> fmt::Debug for Slot<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("set", &self.handler.is_some())
            .finish()
    }
}

pub type MouseHandler = dyn FnMut(&mut Ui, ElementId, &MouseEvent);
pub type FocusHandler = dyn FnMut(&mut Ui, ElementId, Option<ElementId>);
/// Widget-level notification carrying a value of type `A`.
pub type Callback<A> = Slot<dyn FnMut(&mut Ui, ElementId, A)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseSlot {
    Click,
    Enter,
    Leave,
    Down,
    Up,
    Move,
    Repeat,
}

#[derive(Default, Debug)]
pub struct MouseHandlers {
    pub click: Slot<MouseHandler>,
    pub enter: Slot<MouseHandler>,
    pub leave: Slot<MouseHandler>,
    pub down: Slot<MouseHandler>,
    pub up: Slot<MouseHandler>,
    pub moved: Slot<MouseHandler>,
    pub repeat: Slot<MouseHandler>,
    pub lose_focus: Slot<FocusHandler>,
}

impl MouseHandlers {
    pub fn slot(&self, slot: MouseSlot) -> &Slot<MouseHandler> {
        match slot {
            MouseSlot::Click => &self.click,
            MouseSlot::Enter => &self.enter,
            MouseSlot::Leave => &self.leave,
            MouseSlot::Down => &self.down,
            MouseSlot::Up => &self.up,
            MouseSlot::Move => &self.moved,
            MouseSlot::Repeat => &self.repeat,
        }
    }

    pub fn slot_mut(&mut self, slot: MouseSlot) -> &mut Slot<MouseHandler> {
        match slot {
            MouseSlot::Click => &mut self.click,
            MouseSlot::Enter => &mut self.enter,
            MouseSlot::Leave => &mut self.leave,
            MouseSlot::Down => &mut self.down,
            MouseSlot::Up => &mut self.up,
            MouseSlot::Move => &mut self.moved,
            MouseSlot::Repeat => &mut self.repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Slot;

    type Counter = dyn FnMut(&mut u32);

    #[test]
    fn taken_handler_is_restored_when_untouched() {
        let mut slot: Slot<Counter> = Slot::default();
        slot.set(Box::new(|n: &mut u32| *n += 1));
        let (mut handler, generation) = slot.take().unwrap();
        let mut hits = 0;
        handler(&mut hits);
        slot.restore(handler, generation);
        assert!(slot.is_set());
        assert_eq!(hits, 1);
    }

    #[test]
    fn reassignment_while_running_wins() {
        let mut slot: Slot<Counter> = Slot::default();
        slot.set(Box::new(|n: &mut u32| *n += 1));
        let (handler, generation) = slot.take().unwrap();
        slot.set(Box::new(|n: &mut u32| *n += 10));
        slot.restore(handler, generation);

        let (mut current, _) = slot.take().unwrap();
        let mut hits = 0;
        current(&mut hits);
        assert_eq!(hits, 10);
    }

    #[test]
    fn clearing_while_running_stays_cleared() {
        let mut slot: Slot<Counter> = Slot::default();
        slot.set(Box::new(|_: &mut u32| {}));
        let (handler, generation) = slot.take().unwrap();
        slot.clear();
        slot.restore(handler, generation);
        assert!(!slot.is_set());
    }
}
