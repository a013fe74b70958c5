#[cfg(test)]
use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::record::Parameters;

/// Commands understood by the analytics tag. The tag is write-only: nothing
/// is ever read back from it.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkCommand {
    /// `('js', Date)` marks the tag load time.
    Js(DateTime<Utc>),
    /// `('config', destination, {debug_mode, send_page_view})`.
    Config {
        destination: String,
        debug_mode: bool,
        send_page_view: bool,
    },
    /// `('event', name, payload)`.
    Event { name: String, payload: Parameters },
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Analytics sink not loaded")]
    Unavailable,
    #[error("Analytics sink rejected the command: {0}")]
    Rejected(String),
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for normalized analytics commands.
pub trait Sink {
    fn publish(&self, command: SinkCommand) -> Result<(), SinkError>;

    /// Whether the underlying tag is present and callable.
    fn is_available(&self) -> bool {
        true
    }
}

pub type SharedSink = Rc<dyn Sink>;

/// Stands in when no tag could be installed. Every command is dropped.
pub struct DetachedSink;

impl Sink for DetachedSink {
    fn publish(&self, _command: SinkCommand) -> Result<(), SinkError> {
        Err(SinkError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Keeps every published command in memory, in publish order.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    commands: RefCell<Vec<SinkCommand>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<SinkCommand> {
        self.commands.borrow().clone()
    }

    /// Only the `event` commands, as `(name, payload)` pairs.
    pub fn events(&self) -> Vec<(String, Parameters)> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                SinkCommand::Event { name, payload } => Some((name.clone(), payload.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn events_named(&self, name: &str) -> Vec<Parameters> {
        self.events()
            .into_iter()
            .filter(|(event, _)| event == name)
            .map(|(_, payload)| payload)
            .collect()
    }
}

#[cfg(test)]
impl Sink for MemorySink {
    fn publish(&self, command: SinkCommand) -> Result<(), SinkError> {
        self.commands.borrow_mut().push(command);
        Ok(())
    }
}
