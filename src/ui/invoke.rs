use crate::error::UiError;
use crate::ui::{ElementId, Ui};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Work deferred to the UI thread, run with the element it was queued on.
pub type Invocation = Box<dyn FnOnce(&mut Ui, ElementId) + Send>;

/// Per-element FIFO of deferred invocations.
pub(crate) struct InvokeQueue {
    sender: Sender<Invocation>,
    receiver: Receiver<Invocation>,
}

impl InvokeQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub(crate) fn sender(&self) -> Sender<Invocation> {
        self.sender.clone()
    }

    pub(crate) fn push(&self, invocation: Invocation) {
        // Both ends live in this struct, so the channel cannot be disconnected here.
        let _ = self.sender.send(invocation);
    }

    /// Everything queued so far, in FIFO order.
    pub(crate) fn drain(&self) -> Vec<Invocation> {
        self.receiver.try_iter().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }
}

/// Thread-safe handle for queueing work onto one element. The work runs on
/// the UI thread at the start of the next [`Ui::draw`].
#[derive(Clone)]
pub struct RemoteHandle {
    target: ElementId,
    sender: Sender<Invocation>,
}

impl RemoteHandle {
    pub(crate) fn new(target: ElementId, sender: Sender<Invocation>) -> Self {
        Self { target, sender }
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn invoke<F>(&self, invocation: F) -> Result<(), UiError>
    where
        F: FnOnce(&mut Ui, ElementId) + Send + 'static,
    {
        self.sender
            .send(Box::new(invocation))
            .map_err(|_| UiError::Disconnected(self.target))
    }

    /// Appends a white line to the target's text box (a `TextBox`, or the
    /// output of a `Console` or `DialogBox`).
    pub fn write_line(&self, text: impl Into<String>) -> Result<(), UiError> {
        let text = text.into();
        self.invoke(move |ui, id| {
            if let Err(err) = ui.write_line(id, text) {
                tracing::warn!(error = %err, "deferred write_line failed");
            }
        })
    }
}

impl std::fmt::Debug for RemoteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("target", &self.target)
            .finish()
    }
}
