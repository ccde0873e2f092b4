use crate::error::UiError;
use crate::render::push_projection;
use crate::ui::{ElementId, Program, Quad, Renderer, Ui, Uniform};
use crate::view::{PaintEvent, TextBox, Widget};
use glam::Vec4;

impl Ui {
    /// Renders one frame: releases retired batches, runs queued
    /// invocations, then paints the tree back to front.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<(), UiError> {
        self.flush_released(renderer);
        self.run_invokes();
        self.sync_scroll_bars();
        if !self.visible {
            return Ok(());
        }
        if self.projection_dirty {
            push_projection(renderer, self.projection);
            self.projection_dirty = false;
        }
        self.paint_tree(self.root, renderer)?;
        self.flush_released(renderer);
        Ok(())
    }

    /// Advances time-driven widgets by `delta` seconds.
    pub fn update(&mut self, delta: f32) {
        for id in self.preorder(self.root) {
            if let Some(element) = self.elements.get_mut(id) {
                element.widget.update(delta);
            }
        }
    }

    fn run_invokes(&mut self) {
        for id in self.preorder(self.root) {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            for invocation in element.invokes.drain() {
                if !self.elements.contains_key(id) {
                    break;
                }
                invocation(self, id);
            }
        }
    }

    fn sync_scroll_bars(&mut self) {
        let pending: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|(_, element)| {
                matches!(&element.widget, Widget::TextBox(text_box) if text_box.scroll_dirty())
            })
            .map(|(id, _)| id)
            .collect();
        for id in pending {
            TextBox::sync_scroll_bar(self, id);
        }
    }

    fn paint_tree(&mut self, id: ElementId, renderer: &mut dyn Renderer) -> Result<(), UiError> {
        self.paint_background(id, renderer)?;

        let painted = self.with_widget(id, |widget, ui| widget.paint(ui, id, renderer));
        if let Some(Some(PaintEvent::TextVisible)) = painted.transpose()? {
            self.emit(id, TextBox::text_visible_callback, ());
        }

        let children = match self.elements.get(id) {
            Some(element) => element.children().to_vec(),
            None => return Ok(()),
        };
        for child in children {
            if self
                .elements
                .get(child)
                .is_some_and(|element| element.is_visible())
            {
                self.paint_tree(child, renderer)?;
            }
        }
        Ok(())
    }

    fn paint_background(
        &mut self,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), UiError> {
        let element = self.element_mut(id)?;
        if !element.has_background() {
            return Ok(());
        }

        let size = element.size();
        let program = element.background_program();
        let quad = match element.quad {
            Some((quad, built_size, built_program))
                if built_size == size && built_program == program =>
            {
                quad
            }
            stale => {
                if let Some((old, ..)) = stale {
                    renderer.release_batch(old);
                }
                let quad = Quad::upload(size, program, renderer)?;
                element.quad = Some((quad, size, program));
                quad
            }
        };

        let position = Uniform::Vec3(element.corrected_position().as_vec2().extend(0.0));
        let color = element
            .widget
            .background_override()
            .or(element
                .background_texture
                .is_none()
                .then_some(element.background_color))
            .filter(|color| *color != Vec4::ZERO);

        renderer.set_blending(true);
        if let Some(color) = color {
            renderer.use_program(Program::SolidUi);
            renderer.set_uniform(Program::SolidUi, "position", position);
            renderer.set_uniform(Program::SolidUi, "color", Uniform::Vec4(color));
            renderer.draw_batch(quad, 6);
        }
        if let Some(texture) = element.background_texture {
            renderer.bind_texture(texture.id);
            renderer.use_program(Program::TexturedUi);
            renderer.set_uniform(Program::TexturedUi, "position", position);
            renderer.draw_batch(quad, 6);
        }
        renderer.set_blending(false);
        Ok(())
    }
}
