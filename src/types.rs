// src/types.rs

use std::fmt;
use std::str::FromStr;

/// Kind of per-project action a scheduling pass runs.
///
/// Each kind maps onto a script in the project root (`build.sh`, `test.sh`,
/// `deploy.sh`) and a log file suffix (`<project>.build.log`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Build,
    Test,
    Deploy,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Build => "build",
            TaskKind::Test => "test",
            TaskKind::Deploy => "deploy",
        }
    }

    /// Script file name looked up in the project root.
    pub fn script_name(self) -> &'static str {
        match self {
            TaskKind::Build => "build.sh",
            TaskKind::Test => "test.sh",
            TaskKind::Deploy => "deploy.sh",
        }
    }

    /// Present participle used in console output ("Finished building").
    pub fn verb(self) -> &'static str {
        match self {
            TaskKind::Build => "building",
            TaskKind::Test => "testing",
            TaskKind::Deploy => "deploying",
        }
    }

    /// Section title printed before the pass starts.
    pub fn pass_title(self) -> &'static str {
        match self {
            TaskKind::Build => "Building",
            TaskKind::Test => "Testing",
            TaskKind::Deploy => "Deploying",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "build" => Ok(TaskKind::Build),
            "test" => Ok(TaskKind::Test),
            "deploy" => Ok(TaskKind::Deploy),
            other => Err(format!(
                "invalid task kind: {other} (expected \"build\", \"test\" or \"deploy\")"
            )),
        }
    }
}
