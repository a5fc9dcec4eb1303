// src/vcs/mod.rs

//! Git collaborator: which files differ from the base ref.
//!
//! Shells out to `git` through `tokio::process`; every failure carries the
//! command line as context.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Files that differ from the base point of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    /// Branch checked out when the diff was taken.
    pub current_branch: String,
    /// Commit the branch is compared against.
    pub base_point: Option<String>,
    /// Files changed by commits since `base_point`.
    pub committed: BTreeSet<String>,
    /// Staged and working-tree changes not yet committed.
    pub uncommitted: BTreeSet<String>,
}

impl ChangedFiles {
    /// Union of committed and uncommitted changes, sorted.
    pub fn all(&self) -> BTreeSet<String> {
        self.committed.union(&self.uncommitted).cloned().collect()
    }
}

/// A git working copy.
#[derive(Debug, Clone)]
pub struct GitRepo {
    dir: PathBuf,
}

impl GitRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Name of the checked-out branch (`HEAD` when detached).
    pub async fn current_branch(&self) -> Result<String> {
        self.first_line(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    /// Default branch of the remote, from `git branch -r`.
    pub async fn remote_main_branch(&self) -> Result<Option<String>> {
        let lines = self.run(&["branch", "-r"]).await?;
        Ok(parse_remote_head(lines.iter().map(String::as_str)))
    }

    /// Everything changed relative to `base`.
    ///
    /// On a feature branch the comparison point is `merge-base(HEAD, base)`,
    /// so changes that landed on `base` after branching are not picked up.
    /// On `base` itself it is `HEAD~`, so the last commit is built. Staged
    /// and working-tree changes are always included.
    pub async fn changed_files(&self, base: &str) -> Result<ChangedFiles> {
        let current_branch = self.current_branch().await?;
        info!(branch = %current_branch, base, "computing changed files");

        let base_point = if current_branch == base {
            match self.first_line(&["rev-parse", "--verify", "HEAD~"]).await {
                Ok(hash) => Some(hash),
                Err(e) => {
                    warn!(error = %e, "no parent commit on base branch; ignoring committed changes");
                    None
                }
            }
        } else {
            Some(self.first_line(&["merge-base", "HEAD", base]).await?)
        };

        let committed = match &base_point {
            Some(point) => self
                .run(&["diff", "--name-only", point, "HEAD"])
                .await?
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .collect(),
            None => BTreeSet::new(),
        };

        let mut uncommitted = BTreeSet::new();
        for args in [
            &["diff", "--name-status", "--cached"][..],
            &["diff", "--name-status"][..],
        ] {
            for line in self.run(args).await? {
                uncommitted.extend(parse_name_status(&line));
            }
        }

        debug!(
            committed = committed.len(),
            uncommitted = uncommitted.len(),
            "changed files collected"
        );

        Ok(ChangedFiles {
            current_branch,
            base_point,
            committed,
            uncommitted,
        })
    }

    async fn first_line(&self, args: &[&str]) -> Result<String> {
        let lines = self.run(args).await?;
        match lines.into_iter().map(|l| l.trim().to_string()).find(|l| !l.is_empty()) {
            Some(line) => Ok(line),
            None => bail!("`git {}` produced no output", args.join(" ")),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<String>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("running `git {}`", args.join(" ")))?;

        if !output.status.success() {
            bail!(
                "`git {}` failed ({}): {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

/// Paths named by one `git diff --name-status` line.
///
/// `M\tpath` yields the path; renames and copies (`R100\told\tnew`) yield
/// both paths. Malformed lines yield nothing.
pub fn parse_name_status(line: &str) -> Vec<String> {
    let fields: Vec<&str> = line.split('\t').collect();
    match fields.as_slice() {
        [_, path] => vec![path.to_string()],
        [_, from, to, ..] => vec![from.to_string(), to.to_string()],
        _ => Vec::new(),
    }
}

/// Branch name from the `origin/HEAD -> origin/main` line of
/// `git branch -r`.
pub fn parse_remote_head<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().find_map(|line| {
        let (head, target) = line.trim().split_once("->")?;
        if !head.trim_end().ends_with("/HEAD") {
            return None;
        }
        let target = target.trim();
        let name = target.rsplit('/').next().unwrap_or(target);
        (!name.is_empty()).then(|| name.to_string())
    })
}
