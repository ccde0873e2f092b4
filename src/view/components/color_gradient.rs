use crate::error::UiError;
use crate::style::HslColor;
use crate::ui::{
    BatchId, Callback, ElementId, MouseEvent, Program, Quad, Renderer, Ui, Uniform,
};
use crate::view::base_component::{Corner, Element};
use crate::view::Widget;
use glam::{IVec2, Vec2, Vec3};

const GRADIENT_NAME: &str = "ColorGradient";
const HUE_NAME: &str = "HueGradient";

/// Color under `selection` in a gradient square of the given hue: white
/// fades into the hue along x, then everything fades to black along y.
pub fn gradient_color(hue: f32, selection: Vec2) -> Vec3 {
    let hue_color = HslColor::new(hue, 1.0, 0.5).to_rgb();
    Vec3::ONE.lerp(hue_color, selection.x) * selection.y
}

/// Pointer position relative to an element, normalized to `[0, 1]` on
/// both axes.
fn normalized(ui: &Ui, id: ElementId, event: &MouseEvent) -> Option<Vec2> {
    let element = ui.element(id).ok()?;
    let size = element.size().as_vec2();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let local = (event.ui_location - element.corrected_position()).as_vec2();
    Some((local / size).clamp(Vec2::ZERO, Vec2::ONE))
}

fn upload_quad(
    quad: &mut Option<(BatchId, IVec2)>,
    size: IVec2,
    program: Program,
    renderer: &mut dyn Renderer,
) -> Result<BatchId, UiError> {
    match *quad {
        Some((batch, built_for)) if built_for == size => Ok(batch),
        stale => {
            if let Some((old, _)) = stale {
                renderer.release_batch(old);
            }
            let batch = Quad::upload(size, program, renderer)?;
            *quad = Some((batch, size));
            Ok(batch)
        }
    }
}

/// Saturation/lightness square of the color picker. At most one can be
/// attached at a time.
#[derive(Debug)]
pub struct ColorGradient {
    hue: f32,
    selection: Vec2,
    color: Vec3,
    dragging: bool,
    quad: Option<(BatchId, IVec2)>,
    on_color_change: Callback<Vec3>,
}

pub fn build_color_gradient(ui: &mut Ui) -> Result<ElementId, UiError> {
    if ui.get_element(GRADIENT_NAME).is_some() {
        tracing::warn!("only one color gradient can exist at a time");
        return Err(UiError::SingleInstance(GRADIENT_NAME));
    }
    let selection = Vec2::new(0.0, 1.0);
    let gradient = ColorGradient {
        hue: 1.0,
        selection,
        color: gradient_color(1.0, selection),
        dragging: false,
        quad: None,
        on_color_change: Callback::default(),
    };

    let mut element = Element::leaf(Widget::ColorGradient(gradient))
        .with_name(GRADIENT_NAME)
        .with_anchor(Corner::TopLeft)
        .with_position(IVec2::new(30, 50))
        .with_size(IVec2::new(150, 150));
    element
        .on_mouse_down(|ui, id, event| {
            if let Ok(gradient) = ui.widget_mut::<ColorGradient>(id) {
                gradient.dragging = event.is_left();
            }
            ColorGradient::track(ui, id, event);
        })
        .on_mouse_up(|ui, id, event| {
            if let Ok(gradient) = ui.widget_mut::<ColorGradient>(id) {
                gradient.dragging &= !event.is_left();
            }
        })
        .on_mouse_leave(|ui, id, _| {
            if let Ok(gradient) = ui.widget_mut::<ColorGradient>(id) {
                gradient.dragging = false;
            }
        })
        .on_mouse_move(ColorGradient::track);
    Ok(ui.insert(element))
}

impl ColorGradient {
    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn selection(&self) -> Vec2 {
        self.selection
    }

    /// The picked color.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn on_color_change<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, Vec3) + 'static,
    {
        self.on_color_change.set(Box::new(handler));
    }

    fn color_change_callback(&mut self) -> &mut Callback<Vec3> {
        &mut self.on_color_change
    }

    pub fn set_hue(ui: &mut Ui, id: ElementId, hue: f32) -> Result<(), UiError> {
        let gradient = ui.widget_mut::<ColorGradient>(id)?;
        gradient.hue = hue;
        let color = gradient.update_color();
        ui.emit(id, ColorGradient::color_change_callback, color);
        Ok(())
    }

    pub fn set_selection(ui: &mut Ui, id: ElementId, selection: Vec2) -> Result<(), UiError> {
        let gradient = ui.widget_mut::<ColorGradient>(id)?;
        gradient.selection = selection.clamp(Vec2::ZERO, Vec2::ONE);
        let color = gradient.update_color();
        ui.emit(id, ColorGradient::color_change_callback, color);
        Ok(())
    }

    fn update_color(&mut self) -> Vec3 {
        self.color = gradient_color(self.hue, self.selection);
        self.color
    }

    fn track(ui: &mut Ui, id: ElementId, event: &MouseEvent) {
        let dragging = ui
            .widget::<ColorGradient>(id)
            .is_ok_and(|gradient| gradient.dragging);
        if !dragging {
            return;
        }
        if let Some(selection) = normalized(ui, id, event) {
            if let Err(err) = ColorGradient::set_selection(ui, id, selection) {
                tracing::warn!(error = %err, "color gradient update failed");
            }
        }
    }

    pub(crate) fn paint(
        &mut self,
        ui: &mut Ui,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), UiError> {
        let element = ui.element(id)?;
        let (position, size) = (element.corrected_position(), element.size());
        let quad = upload_quad(&mut self.quad, size, Program::Gradient, renderer)?;

        let program = Program::Gradient;
        renderer.use_program(program);
        renderer.set_uniform(program, "position", Uniform::Vec3(position.as_vec2().extend(0.0)));
        renderer.set_uniform(
            program,
            "hue",
            Uniform::Vec3(HslColor::new(self.hue, 1.0, 0.5).to_rgb()),
        );
        renderer.set_uniform(program, "sel", Uniform::Vec2(self.selection));
        renderer.set_uniform(program, "size", Uniform::Vec2(size.as_vec2()));
        renderer.draw_batch(quad, 6);
        Ok(())
    }

    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        out.extend(self.quad.take().map(|(batch, _)| batch));
    }
}

/// Vertical hue strip that drives the attached [`ColorGradient`].
#[derive(Debug)]
pub struct HueGradient {
    hue: f32,
    dragging: bool,
    quad: Option<(BatchId, IVec2)>,
}

pub fn build_hue_gradient(ui: &mut Ui) -> ElementId {
    let mut element = Element::leaf(Widget::HueGradient(HueGradient {
        hue: 0.0,
        dragging: false,
        quad: None,
    }))
    .with_name(HUE_NAME)
    .with_anchor(Corner::TopLeft)
    .with_position(IVec2::new(185, 50))
    .with_size(IVec2::new(26, 150));
    element
        .on_mouse_down(|ui, id, event| {
            if let Ok(strip) = ui.widget_mut::<HueGradient>(id) {
                strip.dragging = event.is_left();
            }
            HueGradient::track(ui, id, event);
        })
        .on_mouse_up(|ui, id, event| {
            if let Ok(strip) = ui.widget_mut::<HueGradient>(id) {
                strip.dragging &= !event.is_left();
            }
        })
        .on_mouse_leave(|ui, id, _| {
            if let Ok(strip) = ui.widget_mut::<HueGradient>(id) {
                strip.dragging = false;
            }
        })
        .on_mouse_move(HueGradient::track);
    ui.insert(element)
}

impl HueGradient {
    pub fn hue(&self) -> f32 {
        self.hue
    }

    fn track(ui: &mut Ui, id: ElementId, event: &MouseEvent) {
        let dragging = ui
            .widget::<HueGradient>(id)
            .is_ok_and(|strip| strip.dragging);
        if !dragging {
            return;
        }
        let Some(hue) = normalized(ui, id, event).map(|point| point.y) else {
            return;
        };
        if let Ok(strip) = ui.widget_mut::<HueGradient>(id) {
            strip.hue = hue;
        }
        if let Some(gradient) = ui.get_element(GRADIENT_NAME) {
            if let Err(err) = ColorGradient::set_hue(ui, gradient, hue) {
                tracing::warn!(error = %err, "hue update failed");
            }
        }
    }

    pub(crate) fn paint(
        &mut self,
        ui: &mut Ui,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<(), UiError> {
        let element = ui.element(id)?;
        let (position, size) = (element.corrected_position(), element.size());
        let quad = upload_quad(&mut self.quad, size, Program::Hue, renderer)?;

        let program = Program::Hue;
        renderer.set_blending(true);
        renderer.use_program(program);
        renderer.set_uniform(program, "position", Uniform::Vec3(position.as_vec2().extend(0.0)));
        renderer.set_uniform(program, "hue", Uniform::Float(self.hue));
        renderer.set_uniform(program, "size", Uniform::Vec2(size.as_vec2()));
        renderer.draw_batch(quad, 6);
        renderer.set_blending(false);
        Ok(())
    }

    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        out.extend(self.quad.take().map(|(batch, _)| batch));
    }
}
