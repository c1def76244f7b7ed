//! Prints build events as they arrive.

use crate::ui;
use bale_bundler::BuildEvent;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

/// Print events until every sender is gone.
pub async fn report(mut events: UnboundedReceiver<BuildEvent>, cwd: PathBuf) {
    while let Some(event) = events.recv().await {
        print_event(&event, &cwd);
    }
}

fn print_event(event: &BuildEvent, cwd: &Path) {
    match event {
        BuildEvent::Started(file_set) => debug!(
            "Bundling {} -> {}",
            ui::display_path(&file_set.entry_file, cwd),
            ui::display_path(&file_set.output_file, cwd)
        ),
        BuildEvent::Update { file_set, file } => ui::info(&format!(
            "{} changed, rebuilding {}",
            ui::display_path(file, cwd),
            ui::display_path(&file_set.output_file, cwd)
        )),
        BuildEvent::Log { file_set, message } => {
            info!("[{}] {}", file_set.output_name(), message)
        }
        BuildEvent::End(file_set) => {
            let size = std::fs::metadata(&file_set.output_file)
                .map(|m| m.len())
                .unwrap_or(0);
            ui::success(&format!(
                "{} ({})",
                ui::display_path(&file_set.output_file, cwd),
                ui::format_size(size)
            ));
        }
        BuildEvent::Error {
            error,
            file_set: Some(_),
        } => ui::error(&error.to_string()),
        // Planning errors are returned to `main` and reported there.
        BuildEvent::Error { file_set: None, .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_bundler::{EventSink, FileSet};

    #[tokio::test]
    async fn test_report_stops_when_senders_drop() {
        let (sink, rx) = EventSink::channel();
        let file_set = FileSet::new("/p/src/a.js", "/p/dist/a.js");
        sink.emit(BuildEvent::Started(file_set.clone()));
        sink.emit(BuildEvent::End(file_set));
        sink.error(bale_bundler::Error::NoEntryFiles);
        drop(sink);

        report(rx, PathBuf::from("/p")).await;
    }
}
