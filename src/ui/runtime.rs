use crate::error::UiError;
use crate::font::{BitmapFont, FontCache, FontSize};
use crate::render::compile_programs;
use crate::ui::{
    BatchId, Callback, Click, MouseEvent, MouseSlot, RemoteHandle, Renderer, Texture, UiConfig,
};
use crate::view::{
    Corner, Element, ElementFlags, ElementKind, ParentFrame, TextBox, Widget, WidgetState,
};
use glam::{IVec2, Mat4, Vec3, Vec4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smol_str::{SmolStr, format_smolstr};
use std::path::Path;
use std::rc::Rc;

slotmap::new_key_type! {
    /// Handle of an element in the UI arena.
    pub struct ElementId;
}

/// Registry name of the root container.
pub const ROOT_NAME: &str = "Screen";

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PointerState {
    /// Last hit-test result.
    pub selection: Option<ElementId>,
    /// Element under the cursor.
    pub current: Option<ElementId>,
    /// Element that received a button down and has not seen the up yet.
    pub active: Option<ElementId>,
    pub focus: Option<ElementId>,
    pub mouse: Click,
    pub last_mouse: Click,
}

impl PointerState {
    fn forget(&mut self, id: ElementId) {
        for slot in [
            &mut self.selection,
            &mut self.current,
            &mut self.active,
            &mut self.focus,
        ] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

/// The user interface context: element arena, name registry, root
/// container, pointer state, font cache and projection.
///
/// `Ui` is neither `Send` nor `Sync`. Other threads reach it through a
/// [`RemoteHandle`].
pub struct Ui {
    pub(crate) elements: SlotMap<ElementId, Element>,
    pub(crate) registry: FxHashMap<SmolStr, ElementId>,
    pub(crate) root: ElementId,
    pub(crate) viewport: IVec2,
    pub(crate) projection: Mat4,
    pub(crate) projection_dirty: bool,
    pub(crate) fonts: FontCache,
    pub(crate) config: UiConfig,
    pub(crate) visible: bool,
    pub(crate) pointer: PointerState,
    pub(crate) key_capture: Vec<ElementId>,
    pub(crate) retired: Vec<BatchId>,
    next_unique_id: u32,
}

impl Ui {
    pub fn new(width: i32, height: i32, config: UiConfig) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(Element::panel().with_name(ROOT_NAME));
        let mut registry = FxHashMap::default();
        registry.insert(SmolStr::new_static(ROOT_NAME), root);

        let mut ui = Self {
            elements,
            registry,
            root,
            viewport: IVec2::ZERO,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
            fonts: FontCache::new(config.font_directory.clone(), config.glyph_capacity),
            config,
            visible: true,
            pointer: PointerState::default(),
            key_capture: Vec::new(),
            retired: Vec::new(),
            next_unique_id: 0,
        };
        ui.on_resize(width, height);
        tracing::info!(width, height, "user interface initialized");
        ui
    }

    /// Compiles the toolkit's shader programs and creates the UI.
    pub fn init(
        renderer: &mut dyn Renderer,
        width: i32,
        height: i32,
        config: UiConfig,
    ) -> Result<Self, UiError> {
        compile_programs(renderer, config.shader_version)?;
        Ok(Self::new(width, height, config))
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn width(&self) -> i32 {
        self.viewport.x
    }

    pub fn height(&self) -> i32 {
        self.viewport.y
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn is_ui_visible(&self) -> bool {
        self.visible
    }

    /// Hides or shows the whole interface. A hidden UI ignores pointer input
    /// and skips painting.
    pub fn set_ui_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn on_resize(&mut self, width: i32, height: i32) {
        self.viewport = IVec2::new(width, height);
        self.projection =
            Mat4::orthographic_rh_gl(0.0, width as f32, 0.0, height as f32, 0.0, 1000.0);
        self.projection_dirty = true;
        if let Some(root) = self.elements.get_mut(self.root) {
            root.core.position = IVec2::ZERO;
            root.core.set_size(self.viewport);
        }
        tracing::debug!(width, height, "viewport resized");
        self.resolve_tree(self.root);
    }

    pub fn focus(&self) -> Option<ElementId> {
        self.pointer.focus
    }

    pub fn current_selection(&self) -> Option<ElementId> {
        self.pointer.current
    }

    pub fn active_selection(&self) -> Option<ElementId> {
        self.pointer.active
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.pointer.selection
    }

    pub fn mouse(&self) -> Click {
        self.pointer.mouse
    }

    pub fn last_mouse(&self) -> Click {
        self.pointer.last_mouse
    }

    /// Adds a detached element to the arena. Unnamed elements get a unique
    /// name derived from their widget kind.
    pub fn insert(&mut self, mut element: Element) -> ElementId {
        if element.name.is_empty() {
            self.next_unique_id += 1;
            element.name = format_smolstr!("{}{}", element.widget.kind_name(), self.next_unique_id);
        }
        self.elements.insert(element)
    }

    pub fn add_element(&mut self, parent: ElementId, child: ElementId) -> Result<(), UiError> {
        let parent_element = self.element(parent)?;
        if !parent_element.is_container() {
            return Err(UiError::NotAContainer(parent));
        }
        let child_element = self.element(child)?;
        if child_element.parent.is_some() || child == self.root {
            return Err(UiError::AlreadyAttached(child));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(UiError::Cycle(child));
        }
        let name = child_element.name.clone();
        if self.registry.contains_key(&name) {
            tracing::warn!(name = %name, "an element with this name already exists");
            return Err(UiError::DuplicateName(name.to_string()));
        }

        self.registry.insert(name, child);
        if let Some(element) = self.elements.get_mut(child) {
            element.parent = Some(parent);
        }
        if let Some(ElementKind::Container(children)) =
            self.elements.get_mut(parent).map(|element| &mut element.kind)
        {
            children.push(child);
        }
        if self.is_attached(parent) {
            self.resolve_tree(child);
        }
        Ok(())
    }

    pub fn add_to_root(&mut self, child: ElementId) -> Result<(), UiError> {
        self.add_element(self.root, child)
    }

    /// Unlinks an element from its parent and the registry. The element and
    /// its subtree stay in the arena and can be added again.
    pub fn detach(&mut self, id: ElementId) -> Result<(), UiError> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or(UiError::UnknownElement(id))?;
        let Some(parent) = element.parent.take() else {
            return Ok(());
        };
        let name = element.name.clone();
        if self.registry.get(&name) == Some(&id) {
            self.registry.remove(&name);
        }
        if let Some(ElementKind::Container(children)) =
            self.elements.get_mut(parent).map(|element| &mut element.kind)
        {
            children.retain(|child| *child != id);
        }
        Ok(())
    }

    /// Detaches and disposes an element, its subtree and any element it
    /// owns outside the subtree. GPU batches are released on the next draw.
    pub fn remove(&mut self, id: ElementId) -> Result<(), UiError> {
        if id == self.root {
            return Err(UiError::RootElement);
        }
        self.detach(id)?;

        let mut owned = Vec::new();
        for victim in self.preorder(id).into_iter().rev() {
            let Some(mut element) = self.elements.remove(victim) else {
                continue;
            };
            if self.registry.get(&element.name) == Some(&victim) {
                self.registry.remove(&element.name);
            }
            if let Some((quad, ..)) = element.quad.take() {
                self.retired.push(quad);
            }
            owned.extend(element.widget.owned_elements());
            element.widget.retire(&mut self.retired);
            self.pointer.forget(victim);
            self.key_capture.retain(|captured| *captured != victim);
        }
        for extra in owned {
            if self.elements.contains_key(extra) {
                self.remove(extra)?;
            }
        }
        tracing::debug!(?id, "element removed");
        Ok(())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, UiError> {
        self.elements.get(id).ok_or(UiError::UnknownElement(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, UiError> {
        self.elements.get_mut(id).ok_or(UiError::UnknownElement(id))
    }

    /// Looks up an attached element by name.
    pub fn get_element(&self, name: &str) -> Option<ElementId> {
        self.registry.get(name).copied()
    }

    pub fn widget<W: WidgetState>(&self, id: ElementId) -> Result<&W, UiError> {
        W::from_widget(&self.element(id)?.widget).ok_or(UiError::WidgetMismatch {
            id,
            expected: W::KIND,
        })
    }

    pub fn widget_mut<W: WidgetState>(&mut self, id: ElementId) -> Result<&mut W, UiError> {
        W::from_widget_mut(&mut self.element_mut(id)?.widget).ok_or(UiError::WidgetMismatch {
            id,
            expected: W::KIND,
        })
    }

    /// Whether `id` is the root or descends from it.
    pub fn is_attached(&self, id: ElementId) -> bool {
        id == self.root || self.ancestors(id).any(|ancestor| ancestor == self.root)
    }

    fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(id), |current| {
            self.elements.get(*current).and_then(|element| element.parent)
        })
    }

    pub fn set_position(&mut self, id: ElementId, position: IVec2) -> Result<(), UiError> {
        self.element_mut(id)?.core.position = position;
        self.relayout(id);
        Ok(())
    }

    pub fn set_size(&mut self, id: ElementId, size: IVec2) -> Result<(), UiError> {
        self.element_mut(id)?.core.set_size(size);
        self.relayout(id);
        Ok(())
    }

    pub fn set_min_size(&mut self, id: ElementId, min_size: IVec2) -> Result<(), UiError> {
        self.element_mut(id)?.core.set_min_size(min_size);
        self.relayout(id);
        Ok(())
    }

    pub fn set_max_size(&mut self, id: ElementId, max_size: IVec2) -> Result<(), UiError> {
        self.element_mut(id)?.core.set_max_size(max_size);
        self.relayout(id);
        Ok(())
    }

    pub fn set_anchor(&mut self, id: ElementId, anchor: Corner) -> Result<(), UiError> {
        self.element_mut(id)?.core.anchor = anchor;
        self.relayout(id);
        Ok(())
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<(), UiError> {
        self.element_mut(id)?
            .flags
            .set(ElementFlags::VISIBLE, visible);
        Ok(())
    }

    pub fn set_disable_picking(&mut self, id: ElementId, disabled: bool) -> Result<(), UiError> {
        self.element_mut(id)?
            .flags
            .set(ElementFlags::DISABLE_PICKING, disabled);
        Ok(())
    }

    pub fn set_background_color(
        &mut self,
        id: ElementId,
        color: impl Into<Vec4>,
    ) -> Result<(), UiError> {
        self.element_mut(id)?.background_color = color.into();
        Ok(())
    }

    pub fn set_background_texture(
        &mut self,
        id: ElementId,
        texture: Option<Texture>,
    ) -> Result<(), UiError> {
        self.element_mut(id)?.background_texture = texture;
        Ok(())
    }

    /// Queues `invocation` on the element; it runs at the start of the next
    /// draw.
    pub fn invoke<F>(&self, id: ElementId, invocation: F) -> Result<(), UiError>
    where
        F: FnOnce(&mut Ui, ElementId) + Send + 'static,
    {
        self.element(id)?.invokes.push(Box::new(invocation));
        Ok(())
    }

    pub fn remote(&self, id: ElementId) -> Result<RemoteHandle, UiError> {
        Ok(RemoteHandle::new(id, self.element(id)?.invokes.sender()))
    }

    /// Number of invocations waiting on an element.
    pub fn pending_invocations(&self, id: ElementId) -> usize {
        self.elements
            .get(id)
            .map_or(0, |element| element.invokes.len())
    }

    /// Appends a white line to a text box, or to the output box of a
    /// console or dialog box.
    pub fn write_line(&mut self, id: ElementId, text: impl AsRef<str>) -> Result<(), UiError> {
        let target = match &self.element(id)?.widget {
            Widget::Console(console) => console.text_box(),
            Widget::DialogBox(dialog) => dialog.text_box(),
            _ => id,
        };
        self.widget_mut::<TextBox>(target)?
            .write_line(Vec3::ONE, text.as_ref());
        Ok(())
    }

    pub fn load_font(
        &mut self,
        path: impl AsRef<Path>,
        renderer: &mut dyn Renderer,
    ) -> Result<Rc<BitmapFont>, UiError> {
        Ok(self.fonts.load(path, renderer)?)
    }

    pub fn load_stock_font(
        &mut self,
        size: FontSize,
        renderer: &mut dyn Renderer,
    ) -> Result<Rc<BitmapFont>, UiError> {
        Ok(self.fonts.load_size(size, renderer)?)
    }

    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontCache {
        &mut self.fonts
    }

    /// Releases every GPU resource owned by the UI and its fonts. Textures
    /// handed to elements by the caller stay with the caller.
    pub fn dispose(mut self, renderer: &mut dyn Renderer) {
        for (_, element) in self.elements.iter_mut() {
            if let Some((quad, ..)) = element.quad.take() {
                self.retired.push(quad);
            }
            element.widget.retire(&mut self.retired);
        }
        self.flush_released(renderer);
        self.fonts.clear(renderer);
        self.elements.clear();
        self.registry.clear();
        tracing::info!("user interface disposed");
    }

    /// Releases the GPU batches of elements removed since the last call.
    pub fn flush_released(&mut self, renderer: &mut dyn Renderer) {
        for batch in self.retired.drain(..) {
            renderer.release_batch(batch);
        }
    }

    pub(crate) fn preorder(&self, from: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(element.children().iter().rev());
        }
        order
    }

    /// Re-resolves an element after one of its layout inputs changed.
    /// Detached containers only run their widget hooks.
    pub(crate) fn relayout(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        if element.is_container() && !self.is_attached(id) {
            self.with_widget(id, |widget, ui| {
                widget.layout(ui, id);
                widget.invalidate(ui, id);
            });
        } else {
            self.resolve_tree(id);
        }
    }

    /// Resolves `id` against its parent, then its children, top-down.
    pub(crate) fn resolve_tree(&mut self, id: ElementId) {
        if !self.elements.contains_key(id) {
            return;
        }
        self.with_widget(id, |widget, ui| widget.layout(ui, id));

        let frame = self.parent_frame(id);
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        element.core.resolve(frame);

        self.with_widget(id, |widget, ui| widget.invalidate(ui, id));

        let children = self
            .elements
            .get(id)
            .map(|element| element.children().to_vec())
            .unwrap_or_default();
        for child in children {
            self.resolve_tree(child);
        }
    }

    fn parent_frame(&self, id: ElementId) -> ParentFrame {
        let parent = self
            .elements
            .get(id)
            .and_then(|element| element.parent)
            .and_then(|parent| self.elements.get(parent));
        match parent {
            Some(parent) => ParentFrame {
                size: parent.size(),
                origin: parent.corrected_position(),
            },
            None => ParentFrame {
                size: self.viewport,
                origin: IVec2::ZERO,
            },
        }
    }

    /// Runs `f` with the element's widget moved out of the arena, so the
    /// widget and the rest of the UI can be borrowed together.
    pub(crate) fn with_widget<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Widget, &mut Ui) -> R,
    ) -> Option<R> {
        let element = self.elements.get_mut(id)?;
        let mut widget = std::mem::take(&mut element.widget);
        let result = f(&mut widget, self);
        match self.elements.get_mut(id) {
            Some(element) => element.widget = widget,
            None => widget.retire(&mut self.retired),
        }
        Some(result)
    }

    pub(crate) fn fire_mouse(&mut self, id: ElementId, slot: MouseSlot, event: &MouseEvent) {
        let taken = self
            .elements
            .get_mut(id)
            .and_then(|element| element.handlers.slot_mut(slot).take());
        let Some((mut handler, generation)) = taken else {
            return;
        };
        tracing::trace!(?id, ?slot, "dispatching mouse event");
        handler(self, id, event);
        if let Some(element) = self.elements.get_mut(id) {
            element.handlers.slot_mut(slot).restore(handler, generation);
        }
    }

    pub(crate) fn fire_lose_focus(&mut self, id: ElementId, new_focus: Option<ElementId>) {
        let taken = self
            .elements
            .get_mut(id)
            .and_then(|element| element.handlers.lose_focus.take());
        let Some((mut handler, generation)) = taken else {
            return;
        };
        handler(self, id, new_focus);
        if let Some(element) = self.elements.get_mut(id) {
            element.handlers.lose_focus.restore(handler, generation);
        }
    }

    /// Invokes a widget callback, selected by `slot`, with `value`.
    pub(crate) fn emit<W, A>(
        &mut self,
        id: ElementId,
        slot: fn(&mut W) -> &mut Callback<A>,
        value: A,
    ) where
        W: WidgetState,
        A: 'static,
    {
        let taken = self.widget_mut::<W>(id).ok().and_then(|widget| slot(widget).take());
        let Some((mut handler, generation)) = taken else {
            return;
        };
        handler(self, id, value);
        if let Ok(widget) = self.widget_mut::<W>(id) {
            slot(widget).restore(handler, generation);
        }
    }
}
