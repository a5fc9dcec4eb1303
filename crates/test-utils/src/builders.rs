#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use monobuild::config::{ConfigFile, Settings};
use monobuild::dag::DependencyGraph;
use monobuild::project::Project;
use tempfile::TempDir;

/// Root under which in-memory fixture projects live.
pub const FIXTURE_ROOT: &str = "/repo";

/// A project named `name` at `/repo/<name>`.
pub fn project(name: &str) -> Project {
    Project::new(name, Path::new(FIXTURE_ROOT).join(name))
}

/// Graph over `/repo/<name>` projects.
///
/// Each edge is `(prerequisite, dependent)`.
pub fn graph_from_edges(names: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for name in names {
        graph.add_project(project(name));
    }
    for (from, to) in edges {
        graph
            .add_dependency(&project(from), &project(to))
            .expect("fixture edge must not be a self-loop");
    }
    graph
}

/// `core <- lib-a, lib-b <- app`: both libraries depend on `core`, `app`
/// depends on both libraries.
pub fn diamond() -> DependencyGraph {
    graph_from_edges(
        &["core", "lib-a", "lib-b", "app"],
        &[
            ("core", "lib-a"),
            ("core", "lib-b"),
            ("lib-a", "app"),
            ("lib-b", "app"),
        ],
    )
}

/// Builder for an on-disk monorepo in a temporary directory.
///
/// Every project gets a `settings.gradle` marker; dependencies are written
/// as `includeBuild` lines into it.
pub struct MonorepoBuilder {
    dir: TempDir,
    patterns: Vec<String>,
}

impl MonorepoBuilder {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join(".monobuild")).expect("create .monobuild");
        Self {
            dir,
            patterns: Vec::new(),
        }
    }

    /// Add a line to `.monobuild/projects.txt`.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    /// Create a project directory with an empty `settings.gradle`.
    pub fn project(self, rel: &str) -> Self {
        let dir = self.dir.path().join(rel);
        fs::create_dir_all(&dir).expect("create project dir");
        let marker = dir.join("settings.gradle");
        if !marker.exists() {
            fs::write(&marker, "").expect("write settings.gradle");
        }
        self
    }

    /// Declare that project `rel` depends on project `dep`.
    pub fn depends_on(self, rel: &str, dep: &str) -> Self {
        let depth = Path::new(rel).components().count();
        let target = format!("{}{}", "../".repeat(depth), dep);
        self.append(rel, "settings.gradle", &format!("includeBuild('{target}')\n"))
    }

    /// Write `<rel>/<kind>.sh` as an executable shell script.
    pub fn script(self, rel: &str, script_name: &str, body: &str) -> Self {
        let path = self.dir.path().join(rel).join(script_name);
        write_executable(&path, &format!("#!/bin/sh\n{body}\n"));
        self
    }

    /// Write an arbitrary file.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write file");
        self
    }

    pub fn build(self) -> Monorepo {
        let list = self.patterns.join("\n");
        fs::write(self.dir.path().join(".monobuild/projects.txt"), list)
            .expect("write projects.txt");
        Monorepo { dir: self.dir }
    }

    fn append(self, rel: &str, file: &str, line: &str) -> Self {
        let path = self.dir.path().join(rel).join(file);
        let mut contents = fs::read_to_string(&path).unwrap_or_default();
        contents.push_str(line);
        fs::write(&path, contents).expect("append to file");
        self
    }
}

impl Default for MonorepoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built on-disk monorepo; deleted on drop.
pub struct Monorepo {
    dir: TempDir,
}

impl Monorepo {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Default settings rooted here, writing output to `<root>/out`.
    pub fn settings(&self, worker_count: usize) -> Settings {
        let mut config = ConfigFile::default();
        config.config.output_dir = self.path("out");
        config.config.worker_count = worker_count;
        Settings::new(self.root(), &config, false, None)
    }
}

pub fn write_executable(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write script");
    let mut perms = fs::metadata(path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod script");
}
