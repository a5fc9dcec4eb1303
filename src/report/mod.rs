// src/report/mod.rs

//! Operator-facing output.
//!
//! Logs go through `tracing` to stderr; the console lines in this module go
//! to stdout and are what a person (or CI log) reads: a section header per
//! phase, `name: value` rows, timings. The project-list and graph files
//! under `<output_dir>/projects/` are written here too.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::dag::DependencyGraph;
use crate::fs::FileSystem;
use crate::project::{relative_display, Project};

/// Total width of headers and footers.
pub const CONSOLE_WIDTH: usize = 90;

/// Width the left column of a `left: right` row is padded to.
pub const LEFT_COLUMN_WIDTH: usize = 35;

/// Directory below the output dir holding project lists and the graph.
pub const PROJECTS_DIR: &str = "projects";

pub const CHANGED_FILE: &str = "changed.txt";
pub const BUILT_FILE: &str = "built.txt";
pub const DEPLOYED_FILE: &str = "deployed.txt";
pub const GRAPH_FILE: &str = "graph.json";

/// `==== Title ====` padded with `=` to [`CONSOLE_WIDTH`] columns.
pub fn header_line(title: &str) -> String {
    let len = title.chars().count();
    if len + 4 > CONSOLE_WIDTH {
        return format!("= {title} =");
    }
    let side = (CONSOLE_WIDTH - len) / 2;
    let left = side + len % 2 - 1;
    let right = side - 1;
    format!("{} {title} {}", "=".repeat(left), "=".repeat(right))
}

pub fn footer_line() -> String {
    "=".repeat(CONSOLE_WIDTH)
}

/// `left` padded to [`LEFT_COLUMN_WIDTH`], then `: right`.
pub fn left_right_line(left: &str, right: impl fmt::Display) -> String {
    format!("{left:<width$}: {right}", width = LEFT_COLUMN_WIDTH)
}

/// Human-readable elapsed time: `850ms`, `12s`, `3m 5s`.
///
/// Seconds are rounded to the nearest whole second.
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        return format!("{millis}ms");
    }
    let seconds = (millis + 500) / 1000;
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}

/// One repo-relative project path per line.
pub fn project_list(repo_dir: &Path, projects: &[Project]) -> String {
    projects
        .iter()
        .map(|p| format!("{}\n", relative_display(repo_dir, p.path())))
        .collect()
}

/// Write a project list to `<output_dir>/projects/<file_name>`.
pub fn write_project_list(
    fs: &dyn FileSystem,
    output_dir: &Path,
    file_name: &str,
    repo_dir: &Path,
    projects: &[Project],
) -> Result<PathBuf> {
    let path = output_dir.join(PROJECTS_DIR).join(file_name);
    fs.write(&path, project_list(repo_dir, projects).as_bytes())
        .with_context(|| format!("writing project list {}", path.display()))?;
    debug!(path = %path.display(), count = projects.len(), "wrote project list");
    Ok(path)
}

/// The graph as a JSON object of project name to the names of its direct
/// dependencies. Keys and values are sorted.
pub fn graph_json(graph: &DependencyGraph) -> Result<String> {
    serde_json::to_string_pretty(&graph.dependency_map()).context("serialising dependency graph")
}

/// Write [`graph_json`] to `<output_dir>/projects/graph.json`.
pub fn write_graph_json(
    fs: &dyn FileSystem,
    output_dir: &Path,
    graph: &DependencyGraph,
) -> Result<PathBuf> {
    let path = output_dir.join(PROJECTS_DIR).join(GRAPH_FILE);
    let json = graph_json(graph)?;
    fs.write(&path, json.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[derive(Debug)]
enum Sink {
    Stdout,
    Buffer(Vec<u8>),
}

/// Line-oriented console output shared by the pipeline and the actions.
///
/// Clones share one sink, and each call writes whole lines under a lock so
/// concurrent actions never interleave within a line.
#[derive(Debug, Clone)]
pub struct Console {
    sink: Arc<Mutex<Sink>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink::Stdout)),
        }
    }

    /// A console that keeps everything in memory; read it with [`Console::captured`].
    pub fn buffered() -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink::Buffer(Vec::new()))),
        }
    }

    /// Everything written so far to a buffered console. Empty for stdout.
    pub fn captured(&self) -> String {
        match &*self.lock() {
            Sink::Buffer(buf) => String::from_utf8_lossy(buf).into_owned(),
            Sink::Stdout => String::new(),
        }
    }

    pub fn line(&self, message: impl AsRef<str>) {
        self.write_block(message.as_ref());
    }

    pub fn header(&self, title: &str) {
        self.write_block(&header_line(title));
    }

    pub fn footer(&self) {
        self.write_block(&footer_line());
    }

    pub fn left_right(&self, left: &str, right: impl fmt::Display) {
        self.write_block(&left_right_line(left, right));
    }

    /// Write a multi-line block (e.g. captured script output) in one piece.
    pub fn block(&self, text: &str) {
        self.write_block(text.trim_end_matches('\n'));
    }

    fn write_block(&self, text: &str) {
        let mut sink = self.lock();
        match &mut *sink {
            Sink::Stdout => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                // A closed stdout is not worth failing a build over.
                let _ = writeln!(out, "{text}");
                let _ = out.flush();
            }
            Sink::Buffer(buf) => {
                buf.extend_from_slice(text.as_bytes());
                buf.push(b'\n');
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
