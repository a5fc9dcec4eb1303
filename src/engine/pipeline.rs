// src/engine/pipeline.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::Settings;
use crate::dag::{DependencyGraph, FileDeclarationSource, GraphBuilder};
use crate::errors::{MonobuildError, Result, SchedulerError};
use crate::exec::{ProjectAction, ScriptAction};
use crate::fs::FileSystem;
use crate::impact::ImpactAnalysis;
use crate::project::discovery::load_patterns;
use crate::project::{discover_project_dirs, relative_display, Project, ProjectRegistry};
use crate::report::{self, Console};
use crate::types::TaskKind;

use super::{run_pass, PassReport};

/// Projects of the repository and the dependency graph between them.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub registry: ProjectRegistry,
    pub graph: DependencyGraph,
}

impl Workspace {
    /// Discover projects under the repository root and build their graph.
    ///
    /// Fails on unreadable patterns or declarations, dangling references and
    /// cycles; nothing is scheduled against a partial graph.
    pub fn load(fs: &dyn FileSystem, settings: &Settings) -> Result<Self> {
        let patterns = load_patterns(fs, &settings.repo_dir)?;
        let dirs = discover_project_dirs(fs, &settings.repo_dir, &patterns, &settings.markers)?;
        let registry = ProjectRegistry::from_dirs(&settings.repo_dir, dirs);
        info!(projects = registry.len(), "discovered projects");

        let source = FileDeclarationSource::new(fs, settings.declaration_file.clone());
        let graph = GraphBuilder::new(&source).build(&registry)?;
        Ok(Self { registry, graph })
    }
}

/// How a pipeline run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// No changed (or no deployable) projects.
    NothingToDo,
    Completed {
        passes: Vec<(TaskKind, PassReport)>,
        elapsed: Duration,
    },
}

/// Sequences the passes of a run and reports them on the console.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    console: Console,
}

impl Pipeline {
    pub fn new(settings: Settings, fs: Arc<dyn FileSystem>, console: Console) -> Self {
        Self {
            settings,
            fs,
            console,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn load_workspace(&self) -> Result<Workspace> {
        Workspace::load(self.fs.as_ref(), &self.settings)
    }

    /// The production action for `kind`, forwarding `args` to the scripts.
    pub fn script_action(&self, kind: TaskKind, args: &[String]) -> Arc<dyn ProjectAction> {
        Arc::new(ScriptAction::new(
            kind,
            args.to_vec(),
            self.settings.log_dir(),
            self.console.clone(),
            Arc::clone(&self.fs),
        ))
    }

    /// Version and run context, printed before any work.
    pub fn print_banner(&self, diff_context: &str) {
        self.console.left_right("Monobuild", env!("CARGO_PKG_VERSION"));
        self.console.left_right("CI", self.settings.ci);
        self.console
            .left_right("Repo directory", self.settings.repo_dir.display());
        self.console
            .left_right("Log directory", self.settings.log_dir().display());
        self.console.left_right("Diff context", diff_context);
    }

    /// Print the changed files under their section headers.
    pub fn print_changed_files<'a, C, U>(&self, committed: C, uncommitted: U)
    where
        C: IntoIterator<Item = &'a String>,
        U: IntoIterator<Item = &'a String>,
    {
        self.console.header("Files changed/committed in branch");
        for file in committed {
            self.console.line(file);
        }
        self.console.header("Files changed & not yet committed");
        for file in uncommitted {
            self.console.line(file);
        }
    }

    /// Map changed files onto projects and report both sets.
    pub fn analyze<I, P>(&self, workspace: &Workspace, changed_files: I) -> ImpactAnalysis
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.console.header("All projects discovered in monorepo");
        for project in workspace.registry.list() {
            self.console.left_right(project.name(), self.relative(project));
        }

        let impact = ImpactAnalysis::analyze(&workspace.graph, changed_files, &self.settings.repo_dir);

        self.console.header("Changed projects");
        if impact.changed.is_empty() {
            self.console.line("No projects changed");
            return impact;
        }
        self.print_projects(&impact.changed);

        self.console.header("Affected projects");
        self.print_projects(&impact.affected);
        impact
    }

    /// Build, then test, every affected project.
    ///
    /// Writes `changed.txt` and `built.txt` before the first pass starts.
    pub async fn build_and_test<I, P>(
        &self,
        workspace: &Workspace,
        changed_files: I,
        build: Arc<dyn ProjectAction>,
        test: Arc<dyn ProjectAction>,
    ) -> Result<PipelineOutcome>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let started = Instant::now();
        let impact = self.analyze(workspace, changed_files);
        if impact.is_empty() {
            return Ok(PipelineOutcome::NothingToDo);
        }

        self.write_list(report::CHANGED_FILE, &impact.changed)?;
        self.write_list(report::BUILT_FILE, &impact.affected)?;

        let graph = impact.affected_graph(&workspace.graph);
        let passes = self
            .run_passes(&graph, &[(TaskKind::Build, build), (TaskKind::Test, test)])
            .await?;

        Ok(self.finish(passes, started, "build"))
    }

    /// Deploy every affected project that has an executable `deploy.sh`.
    ///
    /// The pass runs over the whole affected subgraph so deploy order
    /// follows dependencies; the action skips projects without a script.
    pub async fn deploy<I, P>(
        &self,
        workspace: &Workspace,
        changed_files: I,
        deploy: Arc<dyn ProjectAction>,
    ) -> Result<PipelineOutcome>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let started = Instant::now();
        let impact = ImpactAnalysis::analyze(&workspace.graph, changed_files, &self.settings.repo_dir);

        let deployable: Vec<Project> = impact
            .affected
            .iter()
            .filter(|p| self.is_deployable(p))
            .cloned()
            .collect();

        self.console.header("Pending Deployment");
        if deployable.is_empty() {
            self.console.line("No projects to deploy");
            return Ok(PipelineOutcome::NothingToDo);
        }
        self.print_projects(&deployable);
        self.write_list(report::DEPLOYED_FILE, &deployable)?;

        let graph = impact.affected_graph(&workspace.graph);
        let passes = self
            .run_passes(&graph, &[(TaskKind::Deploy, deploy)])
            .await?;

        Ok(self.finish(passes, started, "deployment"))
    }

    /// Print the dependency table and write `graph.json`.
    pub fn graph(&self, workspace: &Workspace) -> Result<PathBuf> {
        self.console.left_right("Project", "Dependency");
        self.console.footer();
        for project in workspace.graph.projects() {
            let deps = workspace.graph.dependencies_of(project);
            if deps.is_empty() {
                self.console.left_right(project.name(), "");
            }
            for dep in deps {
                self.console.left_right(project.name(), dep.name());
            }
        }

        let path = report::write_graph_json(
            self.fs.as_ref(),
            &self.settings.output_dir,
            &workspace.graph,
        )?;
        info!(path = %path.display(), "wrote dependency graph");
        Ok(path)
    }

    /// Run each pass in order over `graph`, stopping at the first pass that
    /// does not succeed.
    pub async fn run_passes(
        &self,
        graph: &DependencyGraph,
        passes: &[(TaskKind, Arc<dyn ProjectAction>)],
    ) -> Result<Vec<(TaskKind, PassReport)>> {
        let mut reports = Vec::with_capacity(passes.len());
        for (kind, action) in passes {
            self.console.header(kind.pass_title());
            debug!(kind = %kind, projects = graph.len(), "running pass");

            match run_pass(
                graph,
                Arc::clone(action),
                self.settings.worker_count,
                Some(self.settings.timeout),
            )
            .await
            {
                Ok(report) => reports.push((*kind, report)),
                Err(err) => {
                    self.report_failure(*kind, &err);
                    return Err(MonobuildError::Scheduler(err));
                }
            }
        }
        Ok(reports)
    }

    fn report_failure(&self, kind: TaskKind, err: &SchedulerError) {
        let what = match err {
            SchedulerError::Timeout { deadline, .. } => format!(
                "{} timed out after {}",
                kind.pass_title(),
                report::format_duration(*deadline)
            ),
            _ => format!("{} failed", kind.pass_title()),
        };
        self.console.footer();
        self.console.line(what);

        let Some(pass) = err.report() else {
            return;
        };
        for project in &pass.failed {
            self.console.left_right("Failed", project.name());
        }
        for project in &pass.skipped {
            self.console.left_right("Skipped", project.name());
        }
        for project in &pass.unfinished {
            self.console.left_right("Unfinished", project.name());
        }
    }

    fn finish(
        &self,
        passes: Vec<(TaskKind, PassReport)>,
        started: Instant,
        logs_of: &str,
    ) -> PipelineOutcome {
        let elapsed = started.elapsed();
        self.console.footer();
        self.console
            .left_right("Success! Total time", report::format_duration(elapsed));
        self.console.line(format!(
            "You can view all project {logs_of} logs in {}",
            self.settings.log_dir().display()
        ));
        PipelineOutcome::Completed { passes, elapsed }
    }

    fn is_deployable(&self, project: &Project) -> bool {
        self.fs
            .is_executable(&project.path().join(TaskKind::Deploy.script_name()))
    }

    fn print_projects(&self, projects: &[Project]) {
        for project in projects {
            self.console.left_right(project.name(), self.relative(project));
        }
    }

    fn write_list(&self, file_name: &str, projects: &[Project]) -> Result<()> {
        report::write_project_list(
            self.fs.as_ref(),
            &self.settings.output_dir,
            file_name,
            &self.settings.repo_dir,
            projects,
        )?;
        Ok(())
    }

    fn relative(&self, project: &Project) -> String {
        relative_display(&self.settings.repo_dir, project.path())
    }
}
