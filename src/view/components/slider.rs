use crate::error::UiError;
use crate::ui::{Callback, ElementId, MouseEvent, Texture, Ui};
use crate::view::base_component::{Corner, Element};
use crate::view::components::button::{ButtonProps, button_element};
use crate::view::Widget;
use glam::IVec2;

/// Horizontal integer slider with a draggable textured thumb.
#[derive(Debug)]
pub struct Slider {
    min: i32,
    max: i32,
    value: i32,
    lock_to_steps: bool,
    thumb: ElementId,
    dragging: bool,
    drag_origin: i32,
    on_value_changed: Callback<i32>,
}

pub struct SliderProps {
    pub thumb_texture: Texture,
    pub min: i32,
    pub max: i32,
    pub value: i32,
    pub width: i32,
    pub position: IVec2,
    pub anchor: Corner,
    pub lock_to_steps: bool,
}

impl SliderProps {
    pub fn new(thumb_texture: Texture) -> Self {
        Self {
            thumb_texture,
            min: 0,
            max: 10,
            value: 0,
            width: 200,
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            lock_to_steps: false,
        }
    }
}

fn invalid(field: &'static str, value: i32) -> UiError {
    UiError::InvalidValue { field, value }
}

/// Maps `offset` out of `span` onto `travel` pixels, clamped to the track.
fn track_offset(offset: i64, span: i64, travel: i32) -> i32 {
    if span <= 0 || travel <= 0 {
        return 0;
    }
    let x = offset * i64::from(travel) / span;
    x.clamp(0, i64::from(travel)) as i32
}

pub fn build_slider(ui: &mut Ui, props: SliderProps) -> Result<ElementId, UiError> {
    if props.min < 0 || props.min >= props.max {
        return Err(invalid("minimum", props.min));
    }
    if props.value < props.min || props.value > props.max {
        return Err(invalid("value", props.value));
    }

    let mut thumb = ButtonProps::textured(props.thumb_texture);
    thumb.anchor = Corner::BottomLeft;
    let thumb = ui.insert(button_element(thumb));

    let slider = Slider {
        min: props.min,
        max: props.max,
        value: props.value,
        lock_to_steps: props.lock_to_steps,
        thumb,
        dragging: false,
        drag_origin: -1,
        on_value_changed: Callback::default(),
    };
    let mut element = Element::container(Widget::Slider(slider))
        .with_position(props.position)
        .with_anchor(props.anchor)
        .with_size(IVec2::new(props.width, props.thumb_texture.size().y));
    element.on_mouse_move(|ui, id, event| Slider::drag(ui, id, event));
    let id = ui.insert(element);
    ui.add_element(id, thumb)?;

    let thumb_element = ui.element_mut(thumb)?;
    thumb_element
        .on_mouse_down(move |ui, _, event| {
            if let Ok(slider) = ui.widget_mut::<Slider>(id) {
                slider.dragging = event.is_left();
                slider.drag_origin = event.location.x;
            }
        })
        .on_mouse_up(move |ui, _, _| {
            if let Ok(slider) = ui.widget_mut::<Slider>(id) {
                slider.dragging = false;
            }
        })
        .on_mouse_move(move |ui, _, event| Slider::drag(ui, id, event));

    ui.relayout(id);
    Ok(id)
}

impl Slider {
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn minimum(&self) -> i32 {
        self.min
    }

    pub fn maximum(&self) -> i32 {
        self.max
    }

    pub fn lock_to_steps(&self) -> bool {
        self.lock_to_steps
    }

    pub fn set_lock_to_steps(&mut self, lock: bool) {
        self.lock_to_steps = lock;
    }

    pub fn thumb(&self) -> ElementId {
        self.thumb
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn on_value_changed<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Ui, ElementId, i32) + 'static,
    {
        self.on_value_changed.set(Box::new(handler));
    }

    fn value_changed_callback(&mut self) -> &mut Callback<i32> {
        &mut self.on_value_changed
    }

    fn thumb_x(&self, track: i32, thumb: i32) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min);
        track_offset(i64::from(self.value) - i64::from(self.min), span, track - thumb)
    }

    /// Moves the thumb to `value`. Values outside `[minimum, maximum]` are
    /// rejected; the listener fires only when the value actually changes.
    pub fn set_value(ui: &mut Ui, id: ElementId, value: i32) -> Result<(), UiError> {
        let slider = ui.widget_mut::<Slider>(id)?;
        if value < slider.min || value > slider.max {
            return Err(invalid("value", value));
        }
        let changed = slider.value != value;
        slider.value = value;
        Slider::place_thumb(ui, id)?;
        if changed {
            ui.emit(id, Slider::value_changed_callback, value);
        }
        Ok(())
    }

    pub fn set_minimum(ui: &mut Ui, id: ElementId, min: i32) -> Result<(), UiError> {
        let slider = ui.widget_mut::<Slider>(id)?;
        if min < 0 || min >= slider.max {
            return Err(invalid("minimum", min));
        }
        slider.min = min;
        let value = slider.value.max(min);
        Slider::set_value(ui, id, value)
    }

    pub fn set_maximum(ui: &mut Ui, id: ElementId, max: i32) -> Result<(), UiError> {
        let slider = ui.widget_mut::<Slider>(id)?;
        if max < 0 || max <= slider.min {
            return Err(invalid("maximum", max));
        }
        slider.max = max;
        let value = slider.value.min(max);
        Slider::set_value(ui, id, value)
    }

    fn place_thumb(ui: &mut Ui, id: ElementId) -> Result<(), UiError> {
        let track = ui.element(id)?.size().x;
        let slider = ui.widget::<Slider>(id)?;
        let thumb = slider.thumb;
        let x = slider.thumb_x(track, ui.element(thumb)?.size().x);
        ui.set_position(thumb, IVec2::new(x, 0))
    }

    pub(crate) fn invalidate(&mut self, ui: &mut Ui, id: ElementId) {
        let Ok(track) = ui.element(id).map(|element| element.size().x) else {
            return;
        };
        if let Ok(thumb) = ui.element_mut(self.thumb) {
            let x = self.thumb_x(track, thumb.size().x);
            thumb.core.position = IVec2::new(x, 0);
        }
    }

    /// Follows the pointer while the thumb is held. Leaving the track clamps
    /// to the nearest bound.
    fn drag(ui: &mut Ui, id: ElementId, event: &MouseEvent) {
        let Ok(slider) = ui.widget::<Slider>(id) else {
            return;
        };
        if !slider.dragging {
            return;
        }
        let (min, max, lock, thumb) = (slider.min, slider.max, slider.lock_to_steps, slider.thumb);
        let (Ok(track), Ok(thumb_element)) = (ui.element(id), ui.element(thumb)) else {
            return;
        };
        let origin = track.corrected_position().x;
        let width = track.size().x;
        let thumb_width = thumb_element.size().x;
        let thumb_position = thumb_element.position().x;
        let travel = width - thumb_width;
        let mouse = event.location.x;

        let result = if mouse < origin {
            Slider::set_value(ui, id, min)
        } else if mouse > origin + width {
            Slider::set_value(ui, id, max)
        } else {
            if travel <= 0 {
                return;
            }
            let x = mouse - origin - (thumb_width >> 1);
            let percent = (f64::from(x) / f64::from(travel)).clamp(0.0, 1.0);
            let span = i64::from(max) - i64::from(min);
            let target = if lock {
                track_offset((percent * span as f64).round() as i64, span, travel)
            } else {
                x.clamp(0, travel)
            };
            if target == thumb_position {
                return;
            }
            if let Ok(slider) = ui.widget_mut::<Slider>(id) {
                slider.drag_origin = mouse;
            }
            let value = ((span as f64 * percent).round() as i64 + i64::from(min))
                .clamp(i64::from(min), i64::from(max)) as i32;
            Slider::set_value(ui, id, value)
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "slider drag failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SliderProps, build_slider};
    use crate::error::UiError;
    use crate::ui::{Click, MouseButton, MouseState, Texture, TextureId, Ui, UiConfig};
    use crate::view::Slider;
    use glam::IVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn thumb() -> Texture {
        Texture {
            id: TextureId(7),
            width: 20,
            height: 10,
        }
    }

    fn attached_slider(ui: &mut Ui) -> (crate::ui::ElementId, Rc<RefCell<Vec<i32>>>) {
        let id = build_slider(ui, SliderProps::new(thumb())).unwrap();
        ui.add_to_root(id).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ui.widget_mut::<Slider>(id)
            .unwrap()
            .on_value_changed(move |_, _, value| sink.borrow_mut().push(value));
        (id, seen)
    }

    #[test]
    fn thumb_tracks_value() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let (id, _) = attached_slider(&mut ui);
        Slider::set_value(&mut ui, id, 5).unwrap();
        let thumb = ui.widget::<Slider>(id).unwrap().thumb();
        // (5 - 0) * (200 - 20) / 10
        assert_eq!(ui.element(thumb).unwrap().position(), IVec2::new(90, 0));
        assert_eq!(ui.element(thumb).unwrap().corrected_position(), IVec2::new(90, 0));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let (id, seen) = attached_slider(&mut ui);
        assert!(matches!(
            Slider::set_value(&mut ui, id, 11),
            Err(UiError::InvalidValue { field: "value", value: 11 })
        ));
        assert!(Slider::set_value(&mut ui, id, -1).is_err());
        assert!(Slider::set_minimum(&mut ui, id, 10).is_err());
        assert!(Slider::set_maximum(&mut ui, id, 0).is_err());
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn value_change_fires_once_per_distinct_value() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let (id, seen) = attached_slider(&mut ui);
        Slider::set_value(&mut ui, id, 3).unwrap();
        Slider::set_value(&mut ui, id, 3).unwrap();
        Slider::set_value(&mut ui, id, 4).unwrap();
        Slider::set_maximum(&mut ui, id, 2).unwrap();
        assert_eq!(*seen.borrow(), [3, 4, 2]);
    }

    #[test]
    fn dragging_maps_pointer_to_value_and_clamps_outside_the_track() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let (id, seen) = attached_slider(&mut ui);

        // Thumb sits at x 0..20, y 0..10 (platform y 90..100).
        ui.on_mouse_move(5, 95);
        let down = Click::new(IVec2::new(5, 95), Some(MouseButton::Left), MouseState::Down);
        ui.on_mouse_click(down);
        assert!(ui.widget::<Slider>(id).unwrap().is_dragging());

        // x = 100 - 10 = 90, percent = 0.5
        ui.on_mouse_move(100, 95);
        ui.on_mouse_move(100, 95);
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 5);

        ui.on_mouse_move(300, 95);
        ui.on_mouse_move(300, 95);
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 10);

        ui.on_mouse_click(Click { state: MouseState::Up, ..down });
        assert!(!ui.widget::<Slider>(id).unwrap().is_dragging());
        assert_eq!(*seen.borrow(), [5, 10]);
    }

    fn wide_slider(ui: &mut Ui, max: i32, width: i32, lock_to_steps: bool) -> crate::ui::ElementId {
        let mut props = SliderProps::new(thumb());
        props.max = max;
        props.width = width;
        props.lock_to_steps = lock_to_steps;
        let id = build_slider(ui, props).unwrap();
        ui.add_to_root(id).unwrap();
        id
    }

    fn thumb_x(ui: &Ui, id: crate::ui::ElementId) -> i32 {
        let thumb = ui.widget::<Slider>(id).unwrap().thumb();
        ui.element(thumb).unwrap().position().x
    }

    #[test]
    fn large_ranges_place_the_thumb_without_overflow() {
        let mut ui = Ui::new(800, 100, UiConfig::new());
        let id = wide_slider(&mut ui, 100_000_000, 400, false);

        Slider::set_value(&mut ui, id, 50_000_000).unwrap();
        // 50_000_000 * (400 - 20) / 100_000_000
        assert_eq!(thumb_x(&ui, id), 190);
        Slider::set_value(&mut ui, id, 100_000_000).unwrap();
        assert_eq!(thumb_x(&ui, id), 380);

        Slider::set_minimum(&mut ui, id, 99_999_999).unwrap();
        assert_eq!(thumb_x(&ui, id), 380);
        Slider::set_maximum(&mut ui, id, i32::MAX).unwrap();
        assert!((0..=380).contains(&thumb_x(&ui, id)));
    }

    #[test]
    fn thumb_stays_on_the_track_when_the_range_exceeds_the_travel() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let id = wide_slider(&mut ui, 1_000, 200, false);
        for value in (0..=1_000).step_by(37).chain([1_000]) {
            Slider::set_value(&mut ui, id, value).unwrap();
            let x = thumb_x(&ui, id);
            assert!((0..=180).contains(&x), "value {value} placed thumb at {x}");
        }
        assert_eq!(thumb_x(&ui, id), 180);
    }

    #[test]
    fn locked_drag_over_a_large_range() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let id = wide_slider(&mut ui, 100_000_000, 200, true);

        ui.on_mouse_move(5, 95);
        let down = Click::new(IVec2::new(5, 95), Some(MouseButton::Left), MouseState::Down);
        ui.on_mouse_click(down);

        ui.on_mouse_move(100, 95);
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 50_000_000);
        assert_eq!(thumb_x(&ui, id), 90);

        // x = 140, percent = 140 / 180
        ui.on_mouse_move(150, 95);
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 77_777_778);
        assert_eq!(thumb_x(&ui, id), 140);
    }

    #[test]
    fn locked_drag_snaps_when_steps_do_not_divide_the_travel() {
        let mut ui = Ui::new(400, 100, UiConfig::new());
        let id = wide_slider(&mut ui, 7, 200, true);

        ui.on_mouse_move(5, 95);
        let down = Click::new(IVec2::new(5, 95), Some(MouseButton::Left), MouseState::Down);
        ui.on_mouse_click(down);

        // percent = 0.5, 3.5 steps rounds to 4, 4 * 180 / 7 = 102
        ui.on_mouse_move(100, 95);
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 4);
        assert_eq!(thumb_x(&ui, id), 102);

        ui.on_mouse_move(300, 95);
        assert_eq!(ui.widget::<Slider>(id).unwrap().value(), 7);
        assert_eq!(thumb_x(&ui, id), 180);
    }
}
