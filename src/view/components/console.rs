use crate::error::UiError;
use crate::font::BitmapFont;
use crate::ui::{ElementId, Texture, Ui};
use crate::view::base_component::{Corner, Element};
use crate::view::components::text_box::{TextBoxProps, build_text_box};
use crate::view::components::text_input::{TextInputProps, build_text_input};
use crate::view::{TextBox, TextInput, Widget};
use glam::{IVec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

const PROMPT_COLOR: Vec3 = Vec3::ONE;
const ECHO_COLOR: Vec3 = Vec3::new(0.0, 0.6, 0.9);
const ERROR_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// A console command. Receives everything after the opcode.
pub type Command =
    Box<dyn FnMut(&mut Ui, ElementId, &str) -> Result<(), Box<dyn std::error::Error>>>;

/// Scrolling output above a single input line. Each submitted line is
/// echoed and dispatched on its first word.
pub struct Console {
    text_box: ElementId,
    input: ElementId,
    commands: FxHashMap<String, Command>,
}

pub struct ConsoleProps {
    pub font: Rc<BitmapFont>,
    pub size: IVec2,
    pub position: IVec2,
    pub anchor: Corner,
    /// Thumb texture for the output's scroll bar.
    pub scroll_texture: Option<Texture>,
}

impl ConsoleProps {
    pub fn new(font: Rc<BitmapFont>) -> Self {
        Self {
            font,
            size: IVec2::new(500, 300),
            position: IVec2::ZERO,
            anchor: Corner::BottomLeft,
            scroll_texture: None,
        }
    }
}

pub fn build_console(ui: &mut Ui, props: ConsoleProps) -> Result<ElementId, UiError> {
    let mut output = TextBoxProps::new(Rc::clone(&props.font), IVec2::ZERO);
    output.anchor = Corner::TopLeft;
    output.background_color = Vec4::new(0.0, 0.0, 0.0, 0.5);
    output.scroll_texture = props.scroll_texture;
    let text_box = build_text_box(ui, output);

    let mut entry = TextInputProps::new(props.font);
    entry.anchor = Corner::BottomLeft;
    entry.background_color = Vec4::new(0.0, 0.0, 0.0, 0.7);
    let input = build_text_input(ui, entry)?;

    let console = Console {
        text_box,
        input,
        commands: FxHashMap::default(),
    };
    let id = ui.insert(
        Element::container(Widget::Console(console))
            .with_position(props.position)
            .with_anchor(props.anchor)
            .with_size(props.size),
    );
    ui.add_element(id, text_box)?;
    ui.add_element(id, input)?;

    ui.widget_mut::<TextInput>(input)?
        .on_carriage_return(move |ui, _, command| {
            if let Err(err) = Console::execute(ui, id, &command) {
                tracing::warn!(error = %err, "console command dispatch failed");
            }
        });
    ui.relayout(id);
    Ok(id)
}

impl Console {
    /// The output text box.
    pub fn text_box(&self) -> ElementId {
        self.text_box
    }

    pub fn input(&self) -> ElementId {
        self.input
    }

    pub fn register_command<F>(&mut self, opcode: impl Into<String>, command: F)
    where
        F: FnMut(&mut Ui, ElementId, &str) -> Result<(), Box<dyn std::error::Error>> + 'static,
    {
        self.commands.insert(opcode.into(), Box::new(command));
    }

    pub fn remove_command(&mut self, opcode: &str) -> bool {
        self.commands.remove(opcode).is_some()
    }

    pub fn has_command(&self, opcode: &str) -> bool {
        self.commands.contains_key(opcode)
    }

    /// Echoes `line` and runs the command named by its first word with
    /// the rest of the line. Empty lines are ignored.
    pub fn execute(ui: &mut Ui, id: ElementId, line: &str) -> Result<(), UiError> {
        if line.is_empty() {
            return Ok(());
        }
        let console = ui.widget::<Console>(id)?;
        let (text_box, input) = (console.text_box, console.input);
        TextInput::clear(ui, input)?;

        let output = ui.widget_mut::<TextBox>(text_box)?;
        output.write(PROMPT_COLOR, "> ");
        output.write_line(ECHO_COLOR, line);

        let (opcode, args) = line.split_once(' ').unwrap_or((line, ""));
        let Some(mut command) = ui.widget_mut::<Console>(id)?.commands.remove(opcode) else {
            ui.widget_mut::<TextBox>(text_box)?
                .write_line(ERROR_COLOR, "Unknown command");
            return Ok(());
        };
        let result = command(ui, id, args);
        if let Ok(console) = ui.widget_mut::<Console>(id) {
            console.commands.entry(opcode.to_string()).or_insert(command);
        }
        if let Err(err) = result {
            ui.widget_mut::<TextBox>(text_box)?
                .write_line(ERROR_COLOR, &format!("Error while running command: {err}"));
        }
        Ok(())
    }

    pub fn write(
        ui: &mut Ui,
        id: ElementId,
        color: impl Into<Vec3>,
        text: &str,
    ) -> Result<(), UiError> {
        let text_box = ui.widget::<Console>(id)?.text_box;
        ui.widget_mut::<TextBox>(text_box)?.write(color, text);
        Ok(())
    }

    pub fn write_line(
        ui: &mut Ui,
        id: ElementId,
        color: impl Into<Vec3>,
        text: &str,
    ) -> Result<(), UiError> {
        let text_box = ui.widget::<Console>(id)?.text_box;
        ui.widget_mut::<TextBox>(text_box)?.write_line(color, text);
        Ok(())
    }

    pub fn clear(ui: &mut Ui, id: ElementId) -> Result<(), UiError> {
        let text_box = ui.widget::<Console>(id)?.text_box;
        ui.widget_mut::<TextBox>(text_box)?.clear();
        Ok(())
    }

    /// Output fills the console above an input line one font height tall.
    pub(crate) fn layout(&mut self, ui: &mut Ui, id: ElementId) {
        let Ok(size) = ui.element(id).map(Element::size) else {
            return;
        };
        let Ok(line_height) = ui
            .widget::<TextBox>(self.text_box)
            .map(|text_box| text_box.font().height())
        else {
            return;
        };
        if let Ok(output) = ui.element_mut(self.text_box) {
            output.core.set_size(IVec2::new(size.x, size.y - line_height));
        }
        if let Ok(input) = ui.element_mut(self.input) {
            input.core.set_size(IVec2::new(size.x, line_height));
        }
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("text_box", &self.text_box)
            .field("input", &self.input)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
