use super::{BundleEngine, BundleRequest, EngineError, EngineHandle, EngineLogger, EngineOutput};
use crate::process::ToolCommand;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Engine backed by an external command.
///
/// Each build spawns the command with a JSON document on stdin:
///
/// ```json
/// { "request": { "entry": "...", "transforms": [...], ... }, "changed": ["..."] }
/// ```
///
/// Stdout is taken verbatim as the bundle. Every stderr line becomes a log event and
/// a non-zero exit fails the build. The process does not outlive one build, so
/// rebuilds are cold from the engine's point of view.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    tool: ToolCommand,
}

impl CommandEngine {
    /// `argv` is the program followed by its fixed arguments; it runs in `cwd`.
    pub fn new(argv: &[String], cwd: impl Into<PathBuf>) -> Result<Self, EngineError> {
        Ok(Self {
            tool: ToolCommand::from_argv(argv, cwd)?,
        })
    }

    pub fn program(&self) -> &str {
        self.tool.program()
    }
}

impl BundleEngine for CommandEngine {
    fn handle(&self, request: BundleRequest) -> Box<dyn EngineHandle> {
        Box::new(CommandHandle {
            tool: self.tool.clone(),
            request,
        })
    }
}

struct CommandHandle {
    tool: ToolCommand,
    request: BundleRequest,
}

#[derive(Serialize)]
struct Invocation<'a> {
    request: &'a BundleRequest,
    changed: &'a [PathBuf],
}

#[async_trait]
impl EngineHandle for CommandHandle {
    async fn bundle(
        &mut self,
        changed: &[PathBuf],
        logger: &dyn EngineLogger,
    ) -> Result<EngineOutput, EngineError> {
        let input = serde_json::to_vec(&Invocation {
            request: &self.request,
            changed,
        })
        .map_err(|e| EngineError::new(format!("Failed to encode bundle request: {}", e)))?;

        let entry: &Path = &self.request.entry;
        let code = self
            .tool
            .run(&input, &|line| logger.log(line))
            .await
            .map_err(|e| e.in_file(entry))?;

        Ok(EngineOutput::new(code))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl EngineLogger for Lines {
        fn log(&self, message: String) {
            self.0.lock().unwrap().push(message);
        }
    }

    fn request() -> BundleRequest {
        BundleRequest {
            entry: PathBuf::from("/p/src/a.js"),
            base_dir: PathBuf::from("/p"),
            transforms: vec![],
            source_maps: false,
            standalone: None,
            typescript: false,
            watch: false,
        }
    }

    fn sh(script: &str) -> CommandEngine {
        CommandEngine::new(
            &["sh".to_string(), "-c".to_string(), script.to_string()],
            ".",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stdout_is_bundle_and_stderr_is_log() {
        let engine = sh("cat >/dev/null; echo 'bundling' >&2; printf 'var a=1;'");
        let mut handle = engine.handle(request());
        let logger = Lines::default();

        let output = handle.bundle(&[], &logger).await.unwrap();
        assert_eq!(output.code, b"var a=1;");
        assert_eq!(logger.0.lock().unwrap().as_slice(), ["bundling"]);
    }

    #[tokio::test]
    async fn test_request_is_sent_on_stdin() {
        let engine = sh("cat");
        let mut handle = engine.handle(request());

        let output = handle
            .bundle(&[PathBuf::from("/p/src/dep.js")], &Lines::default())
            .await
            .unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&output.code).unwrap();
        assert_eq!(sent["request"]["entry"], "/p/src/a.js");
        assert_eq!(sent["changed"][0], "/p/src/dep.js");
    }

    #[tokio::test]
    async fn test_failure_points_at_entry() {
        let engine = sh("exit 1");
        let mut handle = engine.handle(request());

        let err = handle.bundle(&[], &Lines::default()).await.unwrap_err();
        assert_eq!(err.file, Some(PathBuf::from("/p/src/a.js")));
    }
}
