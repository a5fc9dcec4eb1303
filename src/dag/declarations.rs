// src/dag/declarations.rs

//! Dependency declarations.
//!
//! A project declares another project as a prerequisite with an
//! `includeBuild` statement naming the other project's directory relative to
//! its own root:
//!
//! ```text
//! includeBuild '../core'
//! includeBuild("../lib-a")
//! //#includeBuild '../tools'      <- declared but not included in the build
//! ```
//!
//! Lines that do not match are ignored; most lines in a declaration file are
//! unrelated to dependencies.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::fs::FileSystem;
use crate::project::Project;

static INCLUDE_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?://#)?includeBuild\s*\(*\s*['"]([^'"]+)['"]\s*\)*.*$"#)
        .expect("includeBuild pattern is a valid regex")
});

/// Extract the referenced relative path from one declaration line.
pub fn parse_declaration(line: &str) -> Option<&str> {
    INCLUDE_BUILD
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Referenced relative paths in `lines`, in file order.
pub fn referenced_paths<'a, I>(lines: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().filter_map(parse_declaration).collect()
}

/// Supplies the raw declaration lines of a project.
pub trait DeclarationSource: Send + Sync {
    fn declaration_lines(&self, project: &Project) -> Result<Vec<String>>;
}

/// Reads declarations from a file in each project root (by default
/// `settings.gradle`). A project without that file declares nothing.
#[derive(Debug)]
pub struct FileDeclarationSource<'a> {
    fs: &'a dyn FileSystem,
    file_name: String,
}

impl<'a> FileDeclarationSource<'a> {
    pub fn new(fs: &'a dyn FileSystem, file_name: impl Into<String>) -> Self {
        Self {
            fs,
            file_name: file_name.into(),
        }
    }

    fn declaration_file(&self, project_dir: &Path) -> std::path::PathBuf {
        project_dir.join(&self.file_name)
    }
}

impl DeclarationSource for FileDeclarationSource<'_> {
    fn declaration_lines(&self, project: &Project) -> Result<Vec<String>> {
        let path = self.declaration_file(project.path());
        if !self.fs.exists(&path) {
            return Ok(Vec::new());
        }
        let contents = self
            .fs
            .read_to_string(&path)
            .with_context(|| format!("reading declarations from {:?}", path))?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}
