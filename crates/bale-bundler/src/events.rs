//! Build events delivered to the caller over one ordered channel per run.

use crate::engine::EngineLogger;
use crate::{Error, FileSet};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// A job began its first build.
    Started(FileSet),
    /// A watched source changed; a rebuild of this bundle follows.
    Update { file_set: FileSet, file: PathBuf },
    /// A log line from the engine while building this bundle.
    Log { file_set: FileSet, message: String },
    /// The bundle (and its post-processing) completed.
    End(FileSet),
    /// A job failed, or planning failed when `file_set` is `None`.
    Error {
        error: Error,
        file_set: Option<FileSet>,
    },
}

impl BuildEvent {
    pub fn file_set(&self) -> Option<&FileSet> {
        match self {
            BuildEvent::Started(file_set) | BuildEvent::End(file_set) => Some(file_set),
            BuildEvent::Update { file_set, .. } | BuildEvent::Log { file_set, .. } => {
                Some(file_set)
            }
            BuildEvent::Error { file_set, .. } => file_set.as_ref(),
        }
    }

    /// `End` and `Error` close a build attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildEvent::End(_) | BuildEvent::Error { .. })
    }
}

/// Sending half of the event channel.
///
/// Sending never fails a build: once the receiver is gone events are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<BuildEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BuildEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    /// Emit `error`, tagged with its FileSet when it has one.
    pub fn error(&self, error: Error) {
        let file_set = error.file_set().cloned();
        self.emit(BuildEvent::Error { error, file_set });
    }

    /// Engine logger that tags lines with `file_set`.
    pub fn logger(&self, file_set: &FileSet) -> JobLogger {
        JobLogger {
            sink: self.clone(),
            file_set: file_set.clone(),
        }
    }
}

/// [`EngineLogger`] forwarding to an [`EventSink`].
#[derive(Debug, Clone)]
pub struct JobLogger {
    sink: EventSink,
    file_set: FileSet,
}

impl EngineLogger for JobLogger {
    fn log(&self, message: String) {
        self.sink.emit(BuildEvent::Log {
            file_set: self.file_set.clone(),
            message,
        });
    }
}
