use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use monobuild::errors::TaskError;
use monobuild::exec::{ActionFuture, ProjectAction};
use monobuild::project::Project;

/// One call of the action.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub project: String,
    pub started: Instant,
    pub finished: Option<Instant>,
}

/// A fake action that:
/// - records when each project started and finished
/// - tracks how many calls ran at the same time
/// - fails, panics or hangs for configured projects
#[derive(Debug, Default)]
pub struct RecordingAction {
    delay: Duration,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    hanging: HashSet<String>,
    invocations: Mutex<Vec<Invocation>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep `delay` instead of the default delay for `name`.
    pub fn with_delay_for(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn failing(mut self, names: &[&str]) -> Self {
        self.failing.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn panicking(mut self, names: &[&str]) -> Self {
        self.panicking.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// These projects sleep for an hour.
    pub fn hanging(mut self, names: &[&str]) -> Self {
        self.hanging.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Project names in the order they started.
    pub fn started(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|i| i.project)
            .collect()
    }

    pub fn invocation(&self, name: &str) -> Option<Invocation> {
        self.invocations().into_iter().find(|i| i.project == name)
    }

    /// Highest number of calls in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn begin(&self, name: &str) -> usize {
        self.invocations.lock().unwrap().push(Invocation {
            project: name.to_string(),
            started: Instant::now(),
            finished: None,
        });
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        now
    }

    fn end(&self, name: &str) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        let mut guard = self.invocations.lock().unwrap();
        if let Some(inv) = guard.iter_mut().find(|i| i.project == name) {
            inv.finished = Some(Instant::now());
        }
    }
}

impl ProjectAction for RecordingAction {
    fn name(&self) -> &str {
        "recording"
    }

    fn run<'a>(&'a self, project: &'a Project) -> ActionFuture<'a> {
        Box::pin(async move {
            let name = project.name();
            self.begin(name);

            let delay = self.delays.get(name).copied().unwrap_or(self.delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if self.hanging.contains(name) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }

            self.end(name);

            if self.panicking.contains(name) {
                panic!("recording action told to panic for {name}");
            }
            if self.failing.contains(name) {
                return Err(TaskError::Failed {
                    project: name.to_string(),
                    kind: "recording".to_string(),
                    code: Some(1),
                });
            }
            Ok(())
        })
    }
}
