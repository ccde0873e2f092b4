use crate::ui::ElementId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the renderer contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("texture not found: {0}")]
    TextureNotFound(PathBuf),
    #[error("shader program {program} failed to compile: {log}")]
    ShaderCompile { program: &'static str, log: String },
    #[error("renderer backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("only single-page bitmap fonts are supported (found page id {0})")]
    MultiPage(i64),
    #[error("font descriptor does not declare a page texture")]
    MissingPage,
    #[error("malformed font descriptor at line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error(transparent)]
    Texture(#[from] RenderError),
}

#[derive(Error, Debug)]
pub enum UiError {
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),
    #[error("an element named `{0}` is already registered")]
    DuplicateName(String),
    #[error("element {0:?} already has a parent")]
    AlreadyAttached(ElementId),
    #[error("adding element {0:?} would make it its own ancestor")]
    Cycle(ElementId),
    #[error("element {0:?} has no parent")]
    Detached(ElementId),
    #[error("the root element cannot be removed")]
    RootElement,
    #[error("element {0:?} is not a container")]
    NotAContainer(ElementId),
    #[error("element {id:?} is not a {expected}")]
    WidgetMismatch {
        id: ElementId,
        expected: &'static str,
    },
    #[error("only one `{0}` may exist at a time")]
    SingleInstance(&'static str),
    #[error("a dialog box supports at most 3 responses (got {0})")]
    TooManyResponses(usize),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: i32 },
    #[error("element {0:?} was removed before the invocation could be queued")]
    Disconnected(ElementId),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
