mod config;
mod event;
mod frame;
mod invoke;
mod pointer;
mod render_backend;
mod runtime;

pub use config::*;
pub use event::*;
pub(crate) use invoke::InvokeQueue;
pub use invoke::{Invocation, RemoteHandle};
pub use render_backend::*;
pub use runtime::*;
