// src/exec/task_runner.rs

//! Script-running action: `build.sh`, `test.sh` and `deploy.sh`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::TaskError;
use crate::fs::FileSystem;
use crate::project::Project;
use crate::report::{format_duration, Console};
use crate::types::TaskKind;

use super::action::{ActionFuture, ProjectAction};

/// Runs `./<kind>.sh` in the project directory.
///
/// Combined stdout/stderr is tee'd into `<log_dir>/<project>.<kind>.log`
/// and kept in memory; on failure the captured output is echoed to the
/// console before the failure line. Extra arguments are forwarded to the
/// script as positional parameters.
///
/// For [`TaskKind::Deploy`], projects without an executable `deploy.sh`
/// succeed immediately.
#[derive(Debug, Clone)]
pub struct ScriptAction {
    kind: TaskKind,
    args: Vec<String>,
    log_dir: PathBuf,
    console: Console,
    fs: Arc<dyn FileSystem>,
}

impl ScriptAction {
    pub fn new(
        kind: TaskKind,
        args: Vec<String>,
        log_dir: impl Into<PathBuf>,
        console: Console,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            kind,
            args,
            log_dir: log_dir.into(),
            console,
            fs,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// `<log_dir>/<project>.<kind>.log`
    pub fn log_path(&self, project: &Project) -> PathBuf {
        self.log_dir
            .join(format!("{}.{}.log", project.name(), self.kind))
    }

    /// Whether the project has an executable script for this kind.
    pub fn has_script(&self, project: &Project) -> bool {
        self.fs
            .is_executable(&project.path().join(self.kind.script_name()))
    }

    fn command(&self, project: &Project) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("./{} \"$@\"", self.kind.script_name()))
            .arg("sh")
            .args(&self.args)
            .current_dir(project.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn execute(&self, project: &Project) -> Result<(), TaskError> {
        if self.kind == TaskKind::Deploy && !self.has_script(project) {
            debug!(project = %project, "no executable deploy.sh; nothing to deploy");
            return Ok(());
        }

        let started = Instant::now();
        let log_path = self.log_path(project);
        let mut log = open_log(&log_path)
            .await
            .map_err(|source| self.io_error(project, source))?;

        info!(
            project = %project,
            kind = %self.kind,
            log = %log_path.display(),
            "starting script"
        );

        let mut child = self
            .command(project)
            .spawn()
            .map_err(|source| TaskError::Spawn {
                project: project.name().to_string(),
                kind: self.kind.to_string(),
                source,
            })?;

        let (tx, mut rx) = mpsc::channel::<String>(256);
        if let Some(stdout) = child.stdout.take() {
            forward_lines(project.name(), stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(project.name(), stderr, tx.clone());
        }
        drop(tx);

        let mut captured = String::new();
        while let Some(mut line) = rx.recv().await {
            line.push('\n');
            log.write_all(line.as_bytes())
                .await
                .with_context(|| format!("writing log {}", log_path.display()))
                .map_err(|source| self.io_error(project, source))?;
            captured.push_str(&line);
        }
        log.flush()
            .await
            .with_context(|| format!("flushing log {}", log_path.display()))
            .map_err(|source| self.io_error(project, source))?;

        let status = child
            .wait()
            .await
            .context("waiting for script to exit")
            .map_err(|source| self.io_error(project, source))?;

        let elapsed = format_duration(started.elapsed());
        if status.success() {
            self.console.left_right(
                &format!("Finished {} ({elapsed})", self.kind.verb()),
                project.name(),
            );
            Ok(())
        } else {
            warn!(project = %project, kind = %self.kind, code = ?status.code(), "script failed");
            self.console.block(&captured);
            self.console.left_right(
                &format!("Failed to {} ({elapsed})", self.kind),
                project.name(),
            );
            Err(TaskError::Failed {
                project: project.name().to_string(),
                kind: self.kind.to_string(),
                code: status.code(),
            })
        }
    }

    fn io_error(&self, project: &Project, source: anyhow::Error) -> TaskError {
        TaskError::Io {
            project: project.name().to_string(),
            kind: self.kind.to_string(),
            source,
        }
    }
}

impl ProjectAction for ScriptAction {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn run<'a>(&'a self, project: &'a Project) -> ActionFuture<'a> {
        Box::pin(self.execute(project))
    }
}

async fn open_log(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating log dir {}", parent.display()))?;
    }
    File::create(path)
        .await
        .with_context(|| format!("creating log file {}", path.display()))
}

/// Read `reader` line by line and forward each line to `tx`.
///
/// Bytes that are not valid UTF-8 are replaced, never treated as an error:
/// the pipe must keep draining or the script dies of SIGPIPE.
fn forward_lines<R>(project: &str, reader: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let project = project.to_string();
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(project = %project, error = %e, "stopped reading script output");
                    break;
                }
            }
        }
    });
}
