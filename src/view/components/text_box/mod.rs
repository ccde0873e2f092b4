mod wrap;

use self::wrap::{Line, Run, Wrapper};
use crate::error::UiError;
use crate::font::{BitmapFont, LINE_PITCH};
use crate::ui::{
    BatchId, Callback, ElementId, MouseEvent, Program, Quad, Renderer, Texture, Ui, Uniform,
};
use crate::view::base_component::{Corner, Element, TextLabel};
use crate::view::components::button::{ButtonProps, button_element};
use crate::view::{PaintEvent, Widget};
use glam::{IVec2, Vec2, Vec3, Vec4};
use std::rc::Rc;

const SELECTION_GREEN: Vec4 = Vec4::new(0.3, 0.9, 0.3, 1.0);

/// A drawable piece of a visible line.
#[derive(Debug)]
struct VisibleRun {
    /// Line index relative to `current_line`.
    row: usize,
    x: i32,
    label: TextLabel,
}

#[derive(Debug, Default)]
struct ScrollBar {
    element: Option<ElementId>,
    enabled: bool,
    dragging: bool,
    drag_origin: i32,
}

/// Multi-line, word-wrapped, colored text with optional scroll bar, line
/// selection and typewriter reveal.
///
/// Content is re-wrapped as soon as it changes; the drawable runs of the
/// visible window are rebuilt lazily on the next draw.
#[derive(Debug)]
pub struct TextBox {
    font: Rc<BitmapFont>,
    size: IVec2,
    padding: IVec2,
    runs: Vec<Run>,
    lines: Vec<Line>,
    wrapper: Wrapper,
    current_line: usize,
    max_lines: usize,
    visible: Vec<VisibleRun>,
    dirty: bool,

    selected_line: Option<usize>,
    selected_color: Vec4,
    allow_selection: bool,
    highlight: Option<(BatchId, IVec2)>,

    scroll: ScrollBar,
    scroll_dirty: bool,

    time_per_character: f32,
    elapsed: f32,
    text_visible_fired: bool,

    on_selection_changed: Callback<Option<usize>>,
    on_text_visible: Callback<()>,
}

pub struct TextBoxProps {
    pub font: Rc<BitmapFont>,
    pub size: IVec2,
    pub position: IVec2,
    pub anchor: Corner,
    pub padding: IVec2,
    pub background_color: Vec4,
    /// Thumb texture; without one the box never shows a scroll bar.
    pub scroll_texture: Option<Texture>,
    pub time_per_character: f32,
    pub allow_selection: bool,
}

impl TextBoxProps {
    pub fn new(font: Rc<BitmapFont>, size: IVec2) -> Self {
        Self {
            font,
            size,
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            padding: IVec2::ZERO,
            background_color: Vec4::ZERO,
            scroll_texture: None,
            time_per_character: 0.0,
            allow_selection: false,
        }
    }
}

pub fn build_text_box(ui: &mut Ui, props: TextBoxProps) -> ElementId {
    let scroll_bar = props.scroll_texture.map(|texture| {
        let mut thumb = ButtonProps::textured(texture);
        thumb.anchor = Corner::BottomLeft;
        let half_height = IVec2::new(texture.size().x, texture.size().y / 2);
        ui.insert(button_element(thumb).with_size(half_height))
    });

    let mut text_box = TextBox::new(props.font, props.size);
    text_box.padding = props.padding;
    text_box.time_per_character = props.time_per_character;
    text_box.allow_selection = props.allow_selection;
    text_box.scroll = ScrollBar {
        element: scroll_bar,
        enabled: scroll_bar.is_some(),
        ..ScrollBar::default()
    };

    let mut element = Element::leaf(Widget::TextBox(text_box))
        .with_position(props.position)
        .with_anchor(props.anchor)
        .with_size(props.size)
        .with_background_color(props.background_color);
    element
        .on_mouse_down(|ui, id, event| TextBox::select_at(ui, id, event))
        .on_mouse_move(|ui, id, event| TextBox::drag_scroll_bar(ui, id, event));
    let id = ui.insert(element);

    if let Some(bar) = scroll_bar.and_then(|bar| ui.element_mut(bar).ok()) {
        bar.on_mouse_down(move |ui, _, event| {
            if let Ok(text_box) = ui.widget_mut::<TextBox>(id) {
                text_box.scroll.dragging = event.is_left();
                text_box.scroll.drag_origin = event.location.y;
            }
        })
        .on_mouse_up(move |ui, _, _| {
            if let Ok(text_box) = ui.widget_mut::<TextBox>(id) {
                text_box.scroll.dragging = false;
            }
        })
        .on_mouse_move(move |ui, _, event| TextBox::drag_scroll_bar(ui, id, event))
        .on_lose_focus(move |ui, _, new_focus| ui.fire_lose_focus(id, new_focus));
    }
    id
}

impl TextBox {
    fn new(font: Rc<BitmapFont>, size: IVec2) -> Self {
        let mut text_box = Self {
            font,
            size,
            padding: IVec2::ZERO,
            runs: Vec::new(),
            lines: Vec::new(),
            wrapper: Wrapper::new(size.x, 0),
            current_line: 0,
            max_lines: 0,
            visible: Vec::new(),
            dirty: true,
            selected_line: None,
            selected_color: SELECTION_GREEN,
            allow_selection: false,
            highlight: None,
            scroll: ScrollBar::default(),
            scroll_dirty: false,
            time_per_character: 0.0,
            elapsed: 0.0,
            text_visible_fired: false,
            on_selection_changed: Callback::default(),
            on_text_visible: Callback::default(),
        };
        text_box.update_max_lines();
        text_box
    }

    fn line_pitch(&self) -> f32 {
        self.font.height() as f32 * LINE_PITCH
    }

    fn update_max_lines(&mut self) {
        let pitch = self.line_pitch();
        self.max_lines = if pitch > 0.0 {
            (self.size.y as f32 / pitch).floor().max(0.0) as usize
        } else {
            0
        };
    }

    fn rewrap(&mut self) {
        self.wrapper = Wrapper::new(self.size.x, self.padding.x);
        self.lines.clear();
        for run in &self.runs {
            self.wrapper.append(&mut self.lines, run);
        }
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.scroll_dirty = true;
    }

    pub fn font(&self) -> &Rc<BitmapFont> {
        &self.font
    }

    /// Changes the default font. Text already written keeps its font.
    pub fn set_font(&mut self, font: Rc<BitmapFont>) {
        self.font = font;
        self.update_max_lines();
        self.mark_dirty();
    }

    pub fn padding(&self) -> IVec2 {
        self.padding
    }

    pub fn set_padding(&mut self, padding: IVec2) {
        self.padding = padding;
        self.rewrap();
    }

    /// Appends text to the current line.
    pub fn write(&mut self, color: impl Into<Vec3>, text: &str) {
        let font = Rc::clone(&self.font);
        self.push_run(color.into(), text, font, false);
    }

    pub fn write_with_font(&mut self, color: impl Into<Vec3>, text: &str, font: Rc<BitmapFont>) {
        self.push_run(color.into(), text, font, false);
    }

    /// Appends text and ends the line, then scrolls to the end.
    pub fn write_line(&mut self, color: impl Into<Vec3>, text: &str) {
        let font = Rc::clone(&self.font);
        self.push_run(color.into(), text, font, true);
        self.scroll_to_end();
    }

    pub fn write_line_with_font(
        &mut self,
        color: impl Into<Vec3>,
        text: &str,
        font: Rc<BitmapFont>,
    ) {
        self.push_run(color.into(), text, font, true);
        self.scroll_to_end();
    }

    fn push_run(&mut self, color: Vec3, text: &str, font: Rc<BitmapFont>, newline: bool) {
        self.runs.push(Run {
            color,
            text: text.to_string(),
            font,
            newline,
        });
        if let Some(run) = self.runs.last() {
            self.wrapper.append(&mut self.lines, run);
        }
        self.text_visible_fired = false;
        self.mark_dirty();
    }

    /// Removes all content and restarts the typewriter.
    pub fn clear(&mut self) {
        self.runs.clear();
        self.lines.clear();
        self.wrapper = Wrapper::new(self.size.x, self.padding.x);
        self.current_line = 0;
        self.elapsed = 0.0;
        self.text_visible_fired = false;
        self.mark_dirty();
    }

    pub fn scroll_to_end(&mut self) {
        if self.lines.len() > self.max_lines {
            self.set_current_line(self.lines.len() - self.max_lines);
        }
        self.scroll_dirty = true;
    }

    /// Number of wrapped lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines that fit in the box at the current font size.
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn set_current_line(&mut self, line: usize) {
        self.current_line = line;
        self.mark_dirty();
    }

    /// Text of one wrapped line.
    pub fn line_text(&self, line: usize) -> Option<String> {
        self.lines
            .get(line)
            .map(|segments| segments.iter().map(|segment| segment.text.as_str()).collect())
    }

    pub fn selected_line(&self) -> Option<usize> {
        self.selected_line
    }

    /// Text of the first run on the selected line, or an empty string.
    pub fn selected_line_text(&self) -> &str {
        self.selected_line
            .and_then(|line| self.lines.get(line))
            .and_then(|segments| segments.first())
            .map_or("", |segment| segment.text.as_str())
    }

    pub fn selected_color(&self) -> Vec4 {
        self.selected_color
    }

    pub fn set_selected_color(&mut self, color: impl Into<Vec4>) {
        self.selected_color = color.into();
    }

    pub fn allow_selection(&self) -> bool {
        self.allow_selection
    }

    pub fn set_allow_selection(&mut self, allow: bool) {
        self.allow_selection = allow;
    }

    pub fn scroll_bar(&self) -> Option<ElementId> {
        self.scroll.element
    }

    pub fn allow_scroll_bar(&self) -> bool {
        self.scroll.enabled
    }

    pub fn set_allow_scroll_bar(&mut self, allow: bool) {
        self.scroll.enabled = allow && self.scroll.element.is_some();
        self.scroll_dirty = true;
    }

    pub fn time_per_character(&self) -> f32 {
        self.time_per_character
    }

    pub fn set_time_per_character(&mut self, seconds: f32) {
        self.time_per_character = seconds;
    }

    fn window_chars(&self) -> usize {
        self.lines
            .iter()
            .skip(self.current_line)
            .take(self.max_lines + 1)
            .flatten()
            .map(|segment| segment.text.chars().count())
            .sum()
    }

    fn reveal_time(&self) -> f32 {
        self.time_per_character * self.window_chars() as f32
    }

    /// Characters revealed so far, or `None` once everything is visible.
    fn revealed_chars(&self) -> Option<usize> {
        let total = self.reveal_time();
        if self.time_per_character > 0.0 && self.elapsed < total {
            let chars = self.window_chars() as f32;
            Some(((self.elapsed / total * chars) as usize).max(1))
        } else {
            None
        }
    }

    /// Whether the typewriter has revealed every visible character.
    pub fn text_is_visible(&self) -> bool {
        self.revealed_chars().is_none()
    }

    /// Skips to the end of the reveal, or restarts it.
    pub fn set_text_visible(&mut self, visible: bool) {
        if visible {
            self.elapsed = self.reveal_time();
        } else {
            self.elapsed = 0.0;
            self.text_visible_fired = false;
        }
    }

    pub(crate) fn advance(&mut self, delta: f32) {
        if self.time_per_character > 0.0 {
            self.elapsed += delta;
        }
    }

    pub fn on_selection_changed<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, Option<usize>) + 'static,
    {
        self.on_selection_changed.set(Box::new(handler));
    }

    /// Fires once per reveal cycle, on the first draw with all text visible.
    pub fn on_text_visible<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, ()) + 'static,
    {
        self.on_text_visible.set(Box::new(handler));
    }

    pub fn clear_on_text_visible(&mut self) {
        self.on_text_visible.clear();
    }

    fn selection_changed_callback(&mut self) -> &mut Callback<Option<usize>> {
        &mut self.on_selection_changed
    }

    pub(crate) fn text_visible_callback(&mut self) -> &mut Callback<()> {
        &mut self.on_text_visible
    }

    pub(crate) fn scroll_dirty(&self) -> bool {
        self.scroll_dirty
    }

    pub(crate) fn owned_elements(&self) -> Option<ElementId> {
        self.scroll.element
    }

    /// Selects a line and notifies the listener.
    pub fn select_line(ui: &mut Ui, id: ElementId, line: Option<usize>) -> Result<(), UiError> {
        ui.widget_mut::<TextBox>(id)?.selected_line = line;
        ui.emit(id, TextBox::selection_changed_callback, line);
        Ok(())
    }

    fn select_at(ui: &mut Ui, id: ElementId, event: &MouseEvent) {
        let Ok(element) = ui.element(id) else {
            return;
        };
        let top = element.corrected_position().y + element.size().y;
        let Ok(text_box) = ui.widget::<TextBox>(id) else {
            return;
        };
        let from_top = top - event.ui_location.y;
        let pitch = text_box.line_pitch();
        if from_top < 0 || pitch <= 0.0 {
            return;
        }
        let line = text_box.current_line + (from_top as f32 / pitch) as usize;
        if let Err(err) = TextBox::select_line(ui, id, Some(line)) {
            tracing::warn!(error = %err, "text box selection failed");
        }
    }

    /// Shows, places or hides the scroll bar after content, scroll position
    /// or geometry changed. The bar lives in the text box's parent.
    pub(crate) fn sync_scroll_bar(ui: &mut Ui, id: ElementId) {
        let Ok(text_box) = ui.widget_mut::<TextBox>(id) else {
            return;
        };
        text_box.scroll_dirty = false;
        let Some(bar) = text_box.scroll.element else {
            return;
        };
        let show = text_box.scroll.enabled && text_box.lines.len() > text_box.max_lines;
        let scrollable = text_box.lines.len().saturating_sub(text_box.max_lines);
        let current = text_box.current_line;

        let (Ok(element), Ok(bar_element)) = (ui.element(id), ui.element(bar)) else {
            return;
        };
        let bar_parent = bar_element.parent();
        let bar_height = bar_element.size().y;
        let (position, size) = (element.corrected_position(), element.size());
        let parent = element.parent().filter(|_| show).and_then(|parent| {
            let origin = ui.element(parent).ok()?.corrected_position();
            Some((parent, origin))
        });

        let result = if let Some((parent, parent_position)) = parent {
            let travel = size.y - bar_height;
            let percent = if scrollable == 0 {
                0.0
            } else {
                current as f32 / scrollable as f32
            };
            let y = travel - (percent * travel as f32).round() as i32;
            let offset = position - parent_position + IVec2::new(size.x, y);
            place_scroll_bar(ui, parent, bar, bar_parent.is_none(), offset)
        } else if bar_parent.is_some() {
            ui.detach(bar)
        } else {
            Ok(())
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "scroll bar update failed");
        }
    }

    /// Drags the scroll bar by the pointer's vertical motion and maps the
    /// bar offset back to a line.
    fn drag_scroll_bar(ui: &mut Ui, id: ElementId, event: &MouseEvent) {
        let Ok(text_box) = ui.widget::<TextBox>(id) else {
            return;
        };
        let Some(bar) = text_box.scroll.element.filter(|_| text_box.scroll.dragging) else {
            return;
        };
        let origin = text_box.scroll.drag_origin;
        let scrollable = text_box.lines.len().saturating_sub(text_box.max_lines);

        let (Ok(element), Ok(bar_element)) = (ui.element(id), ui.element(bar)) else {
            return;
        };
        let Some(parent) = element.parent() else {
            return;
        };
        let Ok(parent_position) = ui.element(parent).map(Element::corrected_position) else {
            return;
        };
        let (size, bar_size, bar_position) =
            (element.size(), bar_element.size(), bar_element.position());
        let travel = size.y - bar_size.y;
        if travel <= 0 {
            return;
        }

        let dy = origin - event.location.y;
        let y_min = element.corrected_position().y - parent_position.y;
        let y_max = y_min + travel;
        let y = (bar_position.y + dy).clamp(y_min, y_max);
        if y == bar_position.y {
            return;
        }

        if let Err(err) = ui.set_position(bar, IVec2::new(bar_position.x, y)) {
            tracing::warn!(error = %err, "scroll bar drag failed");
            return;
        }
        let percent = f64::from(y_max - y) / f64::from(travel);
        if let Ok(text_box) = ui.widget_mut::<TextBox>(id) {
            text_box.scroll.drag_origin = event.location.y;
            text_box.current_line = (scrollable as f64 * percent).round() as usize;
            text_box.dirty = true;
        }
    }

    pub(crate) fn invalidate(&mut self, ui: &mut Ui, id: ElementId) {
        let Ok(size) = ui.element(id).map(Element::size) else {
            return;
        };
        if size != self.size {
            self.size = size;
            self.update_max_lines();
            self.rewrap();
        }
        self.scroll_dirty = true;
    }

    /// Rebuilds the drawable runs of the visible window, merging adjacent
    /// segments that share a color and font.
    fn materialize(&mut self, renderer: &mut dyn Renderer) {
        let mut retired = Vec::new();
        for run in &mut self.visible {
            run.label.retire(&mut retired);
        }
        for batch in retired {
            renderer.release_batch(batch);
        }
        self.visible.clear();

        let window = self
            .lines
            .iter()
            .enumerate()
            .skip(self.current_line)
            .take(self.max_lines + 1);
        for (row, line) in window.map(|(index, line)| (index - self.current_line, line)) {
            let mut segments = line.iter();
            let Some(first) = segments.next() else {
                continue;
            };
            let (mut head, mut contents) = (first, first.text.clone());
            for segment in segments {
                if segment.color == head.color && Rc::ptr_eq(&segment.font, &head.font) {
                    contents.push_str(&segment.text);
                } else {
                    if !contents.is_empty() {
                        self.visible.push(visible_run(row, head, contents));
                    }
                    head = segment;
                    contents = segment.text.clone();
                }
            }
            if !contents.is_empty() {
                self.visible.push(visible_run(row, head, contents));
            }
        }
        self.dirty = false;
    }

    pub(crate) fn paint(
        &mut self,
        ui: &mut Ui,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<PaintEvent>, UiError> {
        let element = ui.element(id)?;
        let (position, size) = (element.corrected_position(), element.size());
        if self.dirty {
            self.materialize(renderer);
        }

        let limit = self.revealed_chars();
        let event = match limit {
            None if !self.text_visible_fired => {
                self.text_visible_fired = true;
                Some(PaintEvent::TextVisible)
            }
            _ => None,
        };

        let pitch = self.line_pitch();
        let row_y = |row: usize| position.y - (pitch * (row + 1) as f32 - size.y as f32) as i32;

        if let Some(selected) = self.selected_line.filter(|_| self.allow_selection) {
            let visible_rows = self.lines.len().saturating_sub(self.current_line);
            if let Some(row) = selected
                .checked_sub(self.current_line)
                .filter(|row| *row < visible_rows && *row <= self.max_lines)
            {
                let highlight_size = IVec2::new(size.x, pitch as i32);
                let quad = match self.highlight {
                    Some((quad, built_for)) if built_for == highlight_size => quad,
                    stale => {
                        if let Some((old, _)) = stale {
                            renderer.release_batch(old);
                        }
                        let quad = Quad::upload(highlight_size, Program::SolidUi, renderer)?;
                        self.highlight = Some((quad, highlight_size));
                        quad
                    }
                };
                let origin = Vec3::new(position.x as f32, row_y(row) as f32, 0.0);
                renderer.set_blending(true);
                renderer.use_program(Program::SolidUi);
                renderer.set_uniform(Program::SolidUi, "position", Uniform::Vec3(origin));
                renderer.set_uniform(
                    Program::SolidUi,
                    "color",
                    Uniform::Vec4(self.selected_color),
                );
                renderer.draw_batch(quad, 6);
                renderer.set_blending(false);
            }
        }

        let scratch = ui.fonts.scratch_mut();
        let mut drawn = 0;
        for run in &mut self.visible {
            let chars = run.label.char_count();
            let budget = match limit {
                Some(limit) if drawn >= limit => break,
                Some(limit) if drawn + chars > limit => Some(limit - drawn),
                _ => None,
            };
            let origin = Vec2::new(
                (position.x + self.padding.x + run.x) as f32,
                row_y(run.row) as f32,
            );
            run.label.draw(scratch, renderer, origin, budget)?;
            drawn += budget.unwrap_or(chars);
        }
        Ok(event)
    }

    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        for run in &mut self.visible {
            run.label.retire(out);
        }
        self.visible.clear();
        if let Some((quad, _)) = self.highlight.take() {
            out.push(quad);
        }
        self.dirty = true;
    }
}

fn place_scroll_bar(
    ui: &mut Ui,
    parent: ElementId,
    bar: ElementId,
    attach: bool,
    offset: IVec2,
) -> Result<(), UiError> {
    if attach {
        ui.add_element(parent, bar)?;
    }
    ui.set_anchor(bar, Corner::BottomLeft)?;
    ui.set_position(bar, offset)
}

fn visible_run(row: usize, head: &wrap::Segment, contents: String) -> VisibleRun {
    VisibleRun {
        row,
        x: head.x,
        label: TextLabel::new(Rc::clone(&head.font), contents).with_color(head.color),
    }
}

#[cfg(test)]
mod tests {
    use super::{TextBoxProps, build_text_box};
    use crate::font::fixed_width_font;
    use crate::render::RecordingRenderer;
    use crate::ui::{Click, MouseButton, MouseState, Texture, TextureId, Ui, UiConfig};
    use crate::view::TextBox;
    use glam::{IVec2, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scroll_texture() -> Texture {
        Texture {
            id: TextureId(11),
            width: 10,
            height: 40,
        }
    }

    #[test]
    fn scroll_to_end_shows_the_last_page() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_text_box(
            &mut ui,
            TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(400, 200)),
        );
        let text_box = ui.widget_mut::<TextBox>(id).unwrap();
        assert_eq!(text_box.max_lines(), 10);
        for n in 0..25 {
            text_box.write_line(Vec3::ONE, &format!("line {n}"));
        }
        text_box.scroll_to_end();
        assert_eq!(text_box.line_count(), 25);
        assert_eq!(text_box.current_line(), 15);
    }

    #[test]
    fn line_count_reflects_wrapping() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_text_box(
            &mut ui,
            TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(80, 200)),
        );
        let text_box = ui.widget_mut::<TextBox>(id).unwrap();
        text_box.write_line(Vec3::ONE, "short");
        text_box.write_line(Vec3::ONE, "this line needs wrapping");
        assert_eq!(text_box.line_count(), 4);
        assert_eq!(text_box.line_text(1).as_deref(), Some("this line"));
    }

    #[test]
    fn appended_text_wraps_at_the_current_width() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_text_box(
            &mut ui,
            TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(80, 200)),
        );
        ui.add_to_root(id).unwrap();
        ui.widget_mut::<TextBox>(id)
            .unwrap()
            .write_line(Vec3::ONE, "this line needs wrapping");
        assert_eq!(ui.widget::<TextBox>(id).unwrap().line_count(), 3);

        ui.set_size(id, IVec2::new(400, 200)).unwrap();
        let text_box = ui.widget_mut::<TextBox>(id).unwrap();
        assert_eq!(text_box.line_count(), 1);
        text_box.write_line(Vec3::ONE, "this line needs wrapping");
        assert_eq!(text_box.line_count(), 2);
        assert_eq!(text_box.line_text(1).as_deref(), Some("this line needs wrapping"));

        text_box.clear();
        text_box.write(Vec3::ONE, "a");
        text_box.write_line(Vec3::ONE, "b");
        assert_eq!(text_box.line_text(0).as_deref(), Some("ab"));
    }

    #[test]
    fn write_without_newline_continues_the_line() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_text_box(
            &mut ui,
            TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(400, 200)),
        );
        let text_box = ui.widget_mut::<TextBox>(id).unwrap();
        text_box.write(Vec3::X, "> ");
        text_box.write_line(Vec3::ONE, "help");
        assert_eq!(text_box.line_count(), 1);
        assert_eq!(text_box.line_text(0).as_deref(), Some("> help"));
    }

    #[test]
    fn only_the_visible_window_is_drawn_with_merged_runs() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let id = build_text_box(
            &mut ui,
            TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(400, 40)),
        );
        ui.add_to_root(id).unwrap();
        {
            let text_box = ui.widget_mut::<TextBox>(id).unwrap();
            text_box.write(Vec3::ONE, "a");
            text_box.write_line(Vec3::ONE, "b");
            for _ in 0..5 {
                text_box.write_line(Vec3::X, "red");
            }
            text_box.set_current_line(0);
        }
        // max_lines = floor(40 / 19.2) = 2, window is three lines.
        let mut renderer = RecordingRenderer::new();
        ui.draw(&mut renderer).unwrap();
        assert_eq!(renderer.draws().len(), 3);
        assert_eq!(renderer.draws()[0].1, 12);
    }

    #[test]
    fn typewriter_reveals_progressively_and_notifies_once() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let mut props = TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(400, 200));
        props.time_per_character = 0.1;
        let id = build_text_box(&mut ui, props);
        ui.add_to_root(id).unwrap();
        let fired = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&fired);
        {
            let text_box = ui.widget_mut::<TextBox>(id).unwrap();
            text_box.write_line(Vec3::ONE, "abcdefghij");
            text_box.on_text_visible(move |_, _, _| *sink.borrow_mut() += 1);
        }

        let mut renderer = RecordingRenderer::new();
        ui.update(0.45);
        ui.draw(&mut renderer).unwrap();
        assert_eq!(renderer.draws().last().unwrap().1, 4 * 6);
        assert!(!ui.widget::<TextBox>(id).unwrap().text_is_visible());
        assert_eq!(*fired.borrow(), 0);

        ui.update(1.0);
        ui.draw(&mut renderer).unwrap();
        ui.draw(&mut renderer).unwrap();
        assert!(ui.widget::<TextBox>(id).unwrap().text_is_visible());
        assert_eq!(*fired.borrow(), 1);

        ui.widget_mut::<TextBox>(id).unwrap().clear();
        ui.widget_mut::<TextBox>(id)
            .unwrap()
            .write_line(Vec3::ONE, "again");
        ui.widget_mut::<TextBox>(id).unwrap().set_text_visible(true);
        ui.draw(&mut renderer).unwrap();
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn clicking_selects_the_line_under_the_pointer() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let mut props = TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(400, 200));
        props.allow_selection = true;
        let id = build_text_box(&mut ui, props);
        ui.add_to_root(id).unwrap();
        let picked = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&picked);
        {
            let text_box = ui.widget_mut::<TextBox>(id).unwrap();
            for word in ["zero", "one", "two"] {
                text_box.write_line(Vec3::ONE, word);
            }
            text_box.on_selection_changed(move |_, _, line| *sink.borrow_mut() = line);
        }

        // Box spans y 0..200; platform y 430 is 30px below its top edge.
        ui.on_mouse_move(10, 430);
        ui.on_mouse_click(Click::new(
            IVec2::new(10, 430),
            Some(MouseButton::Left),
            MouseState::Down,
        ));
        assert_eq!(*picked.borrow(), Some(1));
        assert_eq!(ui.widget::<TextBox>(id).unwrap().selected_line_text(), "one");
    }

    #[test]
    fn scroll_bar_appears_in_the_parent_on_overflow() {
        let mut ui = Ui::new(800, 600, UiConfig::new());
        let mut props = TextBoxProps::new(fixed_width_font(7, 16), IVec2::new(400, 40));
        props.scroll_texture = Some(scroll_texture());
        let id = build_text_box(&mut ui, props);
        ui.add_to_root(id).unwrap();
        let bar = ui.widget::<TextBox>(id).unwrap().scroll_bar().unwrap();

        let mut renderer = RecordingRenderer::new();
        ui.draw(&mut renderer).unwrap();
        assert!(ui.element(bar).unwrap().parent().is_none());

        for n in 0..4 {
            ui.widget_mut::<TextBox>(id)
                .unwrap()
                .write_line(Vec3::ONE, &format!("{n}"));
        }
        ui.draw(&mut renderer).unwrap();
        let bar_element = ui.element(bar).unwrap();
        assert_eq!(bar_element.parent(), Some(ui.root()));
        assert_eq!(bar_element.size(), IVec2::new(10, 20));
        // Scrolled to the end: the bar sits at the bottom of the box.
        assert_eq!(bar_element.position(), IVec2::new(400, 0));

        ui.remove(id).unwrap();
        assert!(!ui.contains(bar));
    }
}
