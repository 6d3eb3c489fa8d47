// src/exec/command.rs

//! External process invocation for tasks that delegate to other tools
//! (style-guide generator, visual regression).

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// A program plus arguments, run directly (no shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable command line for logs and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|s| s.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Spawn the process and wait for it, streaming its output to `tracing`.
    ///
    /// Fails if the program cannot be spawned or exits non-zero. The child
    /// is killed if the returned future is dropped.
    pub async fn run(&self) -> Result<()> {
        let cmdline = self.display();
        info!(cmd = %cmdline, "starting external command");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning '{cmdline}'"))?;

        let stdout = child.stdout.take().map(|s| forward_lines(s, &self.program, "stdout"));
        let stderr = child.stderr.take().map(|s| forward_lines(s, &self.program, "stderr"));

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for '{cmdline}'"))?;

        // Drain the readers so trailing output is logged before we return.
        for handle in [stdout, stderr].into_iter().flatten() {
            let _ = handle.await;
        }

        let code = status.code().unwrap_or(-1);
        info!(cmd = %cmdline, exit_code = code, success = status.success(), "external command exited");

        if !status.success() {
            bail!("'{cmdline}' exited with status {code}");
        }
        Ok(())
    }
}

fn forward_lines<R>(reader: R, program: &str, stream: &'static str) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let program = program.to_string();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if stream == "stderr" {
                warn!(program = %program, "{stream}: {line}");
            } else {
                info!(program = %program, "{line}");
            }
        }
    })
}
