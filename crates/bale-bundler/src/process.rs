//! External tool invocation shared by the command engine and command minifier.

use crate::engine::EngineError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Number of stderr lines kept in the failure message.
const STDERR_TAIL: usize = 20;

/// A program plus fixed arguments, run with a payload on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ToolCommand {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
}

impl ToolCommand {
    pub(crate) fn from_argv(argv: &[String], cwd: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let (program, args) = argv
            .split_first()
            .filter(|(program, _)| !program.is_empty())
            .ok_or_else(|| EngineError::new("Tool command is empty"))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.into(),
        })
    }

    pub(crate) fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool, feeding `input` on stdin and handing every stderr line to
    /// `on_stderr`. Returns stdout when the tool exits successfully.
    pub(crate) async fn run(
        &self,
        input: &[u8],
        on_stderr: &(dyn Fn(String) + Send + Sync),
    ) -> Result<Vec<u8>, EngineError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::new(format!("Failed to start `{}`: {}", self.program, e)))?;

        let (Some(mut stdin), Some(mut stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(EngineError::new(format!(
                "`{}` was started without piped stdio",
                self.program
            )));
        };

        let write = async move {
            let result = stdin.write_all(input).await;
            drop(stdin);
            match result {
                // Tools that exit without reading stdin are judged by their exit status.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };
        let read = async move {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await.map(|_| buf)
        };
        let log = async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut tail = Vec::new();
            while let Some(line) = lines.next_line().await? {
                on_stderr(line.clone());
                tail.push(line);
                if tail.len() > STDERR_TAIL {
                    tail.remove(0);
                }
            }
            Ok::<_, std::io::Error>(tail)
        };

        let (written, output, tail) = tokio::join!(write, read, log);
        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::new(format!("Failed to wait for `{}`: {}", self.program, e)))?;

        let io_error = |e: std::io::Error| {
            EngineError::new(format!("I/O error talking to `{}`: {}", self.program, e))
        };
        written.map_err(io_error)?;
        let output = output.map_err(io_error)?;
        let tail = tail.map_err(io_error)?;

        if !status.success() {
            let mut message = format!("`{}` exited with {}", self.program, status);
            if !tail.is_empty() {
                message.push('\n');
                message.push_str(&tail.join("\n"));
            }
            return Err(EngineError::new(message));
        }

        Ok(output)
    }
}
