use super::core::{Corner, ElementCore};
use crate::ui::{
    BatchId, ElementId, InvokeQueue, MouseEvent, MouseHandlers, MouseSlot, Program, Texture, Ui,
};
use crate::view::Widget;
use bitflags::bitflags;
use glam::{IVec2, Vec4};
use smol_str::SmolStr;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ElementFlags: u8 {
        const VISIBLE = 1 << 0;
        const DISABLE_PICKING = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Leaf,
    Container(Vec<ElementId>),
}

/// A node of the UI tree: geometry, flags, background, mouse handlers and
/// the widget state that decides how it draws.
pub struct Element {
    pub(crate) name: SmolStr,
    pub(crate) core: ElementCore,
    pub(crate) kind: ElementKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) flags: ElementFlags,
    pub(crate) background_color: Vec4,
    pub(crate) background_texture: Option<Texture>,
    /// Background quad and the size it was built for.
    pub(crate) quad: Option<(BatchId, IVec2, Program)>,
    pub(crate) handlers: MouseHandlers,
    pub(crate) invokes: InvokeQueue,
    pub(crate) widget: Widget,
}

impl Element {
    pub fn leaf(widget: Widget) -> Self {
        Self::new(ElementKind::Leaf, widget)
    }

    pub fn container(widget: Widget) -> Self {
        Self::new(ElementKind::Container(Vec::new()), widget)
    }

    /// An empty container with no drawing of its own besides the background.
    pub fn panel() -> Self {
        Self::container(Widget::Panel)
    }

    fn new(kind: ElementKind, widget: Widget) -> Self {
        Self {
            name: SmolStr::default(),
            core: ElementCore::new(IVec2::ZERO, IVec2::ZERO, Corner::BottomLeft),
            kind,
            parent: None,
            flags: ElementFlags::VISIBLE,
            background_color: Vec4::ZERO,
            background_texture: None,
            quad: None,
            handlers: MouseHandlers::default(),
            invokes: InvokeQueue::new(),
            widget,
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: IVec2) -> Self {
        self.core.position = position;
        self
    }

    pub fn with_size(mut self, size: IVec2) -> Self {
        self.core.set_size(size);
        self
    }

    pub fn with_min_size(mut self, min_size: IVec2) -> Self {
        self.core.set_min_size(min_size);
        self
    }

    pub fn with_max_size(mut self, max_size: IVec2) -> Self {
        self.core.set_max_size(max_size);
        self
    }

    pub fn with_anchor(mut self, anchor: Corner) -> Self {
        self.core.anchor = anchor;
        self
    }

    pub fn with_background_color(mut self, color: impl Into<Vec4>) -> Self {
        self.background_color = color.into();
        self
    }

    pub fn with_background_texture(mut self, texture: Texture) -> Self {
        self.background_texture = Some(texture);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.flags.set(ElementFlags::VISIBLE, visible);
        self
    }

    pub fn with_disable_picking(mut self, disabled: bool) -> Self {
        self.flags.set(ElementFlags::DISABLE_PICKING, disabled);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> IVec2 {
        self.core.position
    }

    pub fn size(&self) -> IVec2 {
        self.core.size
    }

    pub fn min_size(&self) -> IVec2 {
        self.core.min_size
    }

    pub fn max_size(&self) -> IVec2 {
        self.core.max_size
    }

    pub fn anchor(&self) -> Corner {
        self.core.anchor
    }

    /// Absolute bottom-left-origin position, valid once laid out.
    pub fn corrected_position(&self) -> IVec2 {
        self.core.corrected_position
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Container(_))
    }

    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Container(children) => children,
            ElementKind::Leaf => &[],
        }
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }

    pub fn picking_disabled(&self) -> bool {
        self.flags.contains(ElementFlags::DISABLE_PICKING)
    }

    pub fn background_color(&self) -> Vec4 {
        self.background_color
    }

    pub fn background_texture(&self) -> Option<Texture> {
        self.background_texture
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// Hit test against the element's own rectangle.
    pub fn pick(&self, point: IVec2) -> bool {
        !self.picking_disabled() && self.core.contains(point)
    }

    pub(crate) fn has_background(&self) -> bool {
        self.background_color != Vec4::ZERO
            || self.background_texture.is_some()
            || self.widget.background_override().is_some()
    }

    pub(crate) fn background_program(&self) -> Program {
        if self.background_texture.is_some() {
            Program::TexturedUi
        } else {
            Program::SolidUi
        }
    }

    pub fn on_click<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.click.set(Box::new(handler));
        self
    }

    pub fn on_mouse_enter<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.enter.set(Box::new(handler));
        self
    }

    pub fn on_mouse_leave<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.leave.set(Box::new(handler));
        self
    }

    pub fn on_mouse_down<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.down.set(Box::new(handler));
        self
    }

    pub fn on_mouse_up<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.up.set(Box::new(handler));
        self
    }

    pub fn on_mouse_move<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.moved.set(Box::new(handler));
        self
    }

    pub fn on_mouse_repeat<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, &MouseEvent) + 'static,
    {
        self.handlers.repeat.set(Box::new(handler));
        self
    }

    /// Called with the element that took focus, or `None` when focus was
    /// dropped.
    pub fn on_lose_focus<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut Ui, ElementId, Option<ElementId>) + 'static,
    {
        self.handlers.lose_focus.set(Box::new(handler));
        self
    }

    pub fn clear_handler(&mut self, slot: MouseSlot) -> &mut Self {
        self.handlers.slot_mut(slot).clear();
        self
    }

    pub fn clear_lose_focus(&mut self) -> &mut Self {
        self.handlers.lose_focus.clear();
        self
    }

    pub fn has_handler(&self, slot: MouseSlot) -> bool {
        self.handlers.slot(slot).is_set()
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("widget", &self.widget.kind_name())
            .field("position", &self.core.position)
            .field("size", &self.core.size)
            .field("corrected_position", &self.core.corrected_position)
            .finish()
    }
}
