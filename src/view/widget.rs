use crate::error::UiError;
use crate::ui::{BatchId, ElementId, Renderer, Ui};
use crate::view::{
    Button, CheckBox, ColorGradient, Console, DialogBox, HueGradient, ListBox, Slider, Text,
    TextBox, TextInput,
};
use glam::Vec4;

/// Typed state of an element. The variant decides how the element lays out
/// its children and what it draws on top of its background.
#[derive(Debug, Default)]
pub enum Widget {
    #[default]
    Panel,
    Text(Text),
    Button(Button),
    CheckBox(CheckBox),
    Slider(Slider),
    TextBox(TextBox),
    TextInput(TextInput),
    ListBox(ListBox),
    ColorGradient(ColorGradient),
    HueGradient(HueGradient),
    DialogBox(DialogBox),
    Console(Console),
}

/// Something a widget's paint pass wants the UI to dispatch once the
/// widget is back in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaintEvent {
    TextVisible,
}

impl Widget {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Widget::Panel => "Panel",
            Widget::Text(_) => Text::KIND,
            Widget::Button(_) => Button::KIND,
            Widget::CheckBox(_) => CheckBox::KIND,
            Widget::Slider(_) => Slider::KIND,
            Widget::TextBox(_) => TextBox::KIND,
            Widget::TextInput(_) => TextInput::KIND,
            Widget::ListBox(_) => ListBox::KIND,
            Widget::ColorGradient(_) => ColorGradient::KIND,
            Widget::HueGradient(_) => HueGradient::KIND,
            Widget::DialogBox(_) => DialogBox::KIND,
            Widget::Console(_) => Console::KIND,
        }
    }

    /// Runs before the element's own position is resolved. Composite widgets
    /// size and place their children here.
    pub(crate) fn layout(&mut self, ui: &mut Ui, id: ElementId) {
        match self {
            Widget::CheckBox(check_box) => check_box.layout(ui, id),
            Widget::ListBox(list_box) => list_box.layout(ui, id),
            Widget::DialogBox(dialog) => dialog.layout(ui, id),
            Widget::Console(console) => console.layout(ui, id),
            _ => {}
        }
    }

    /// Runs after the element's corrected position and size are final.
    pub(crate) fn invalidate(&mut self, ui: &mut Ui, id: ElementId) {
        match self {
            Widget::Slider(slider) => slider.invalidate(ui, id),
            Widget::TextBox(text_box) => text_box.invalidate(ui, id),
            _ => {}
        }
    }

    pub(crate) fn paint(
        &mut self,
        ui: &mut Ui,
        id: ElementId,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<PaintEvent>, UiError> {
        match self {
            Widget::Text(text) => text.paint(ui, id, renderer).map(|_| None),
            Widget::Button(button) => button.paint(ui, id, renderer).map(|_| None),
            Widget::TextBox(text_box) => text_box.paint(ui, id, renderer),
            Widget::ColorGradient(gradient) => gradient.paint(ui, id, renderer).map(|_| None),
            Widget::HueGradient(gradient) => gradient.paint(ui, id, renderer).map(|_| None),
            _ => Ok(None),
        }
    }

    pub(crate) fn update(&mut self, delta: f32) {
        if let Widget::TextBox(text_box) = self {
            text_box.advance(delta);
        }
    }

    /// Hands every GPU batch the widget owns to `out` for release.
    pub(crate) fn retire(&mut self, out: &mut Vec<BatchId>) {
        match self {
            Widget::Text(text) => text.retire(out),
            Widget::Button(button) => button.retire(out),
            Widget::TextBox(text_box) => text_box.retire(out),
            Widget::ColorGradient(gradient) => gradient.retire(out),
            Widget::HueGradient(gradient) => gradient.retire(out),
            _ => {}
        }
    }

    /// Elements the widget keeps alive outside its own subtree, such as
    /// pop-ups shown in the parent. They are removed with the widget.
    pub(crate) fn owned_elements(&self) -> Option<ElementId> {
        match self {
            Widget::TextBox(text_box) => text_box.owned_elements(),
            Widget::ListBox(list_box) => Some(list_box.drop_down()),
            Widget::DialogBox(dialog) => dialog.owned_elements(),
            _ => None,
        }
    }

    /// Background color to use instead of the element's own.
    pub(crate) fn background_override(&self) -> Option<Vec4> {
        match self {
            Widget::Button(button) => button.active_color(),
            _ => None,
        }
    }
}

/// Typed access to one variant of [`Widget`].
pub trait WidgetState: Sized + 'static {
    const KIND: &'static str;

    fn from_widget(widget: &Widget) -> Option<&Self>;
    fn from_widget_mut(widget: &mut Widget) -> Option<&mut Self>;
}

macro_rules! widget_state {
    ($($ty:ident),* $(,)?) => {
        $(
            impl WidgetState for $ty {
                const KIND: &'static str = stringify!($ty);

                fn from_widget(widget: &Widget) -> Option<&Self> {
                    match widget {
                        Widget::$ty(state) => Some(state),
                        _ => None,
                    }
                }

                fn from_widget_mut(widget: &mut Widget) -> Option<&mut Self> {
                    match widget {
                        Widget::$ty(state) => Some(state),
                        _ => None,
                    }
                }
            }
        )*
    };
}

widget_state!(
    Text,
    Button,
    CheckBox,
    Slider,
    TextBox,
    TextInput,
    ListBox,
    ColorGradient,
    HueGradient,
    DialogBox,
    Console,
);
