//! Watch session: rebuild whenever a file the last build read changes.
//!
//! ```text
//! Idle ─► Building ─► Watching ─┬─ input changed ─► Building ─► Watching
//!                               └─ cancel ─────────► Stopped
//! ```
//!
//! The initial build runs on the caller's thread; the loop then moves to its
//! own thread. Build failures are reported and the session keeps going.

mod debouncer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use self::debouncer::Debouncer;
use crate::compiler::{BuildContext, BuildResult};
use crate::logger;
use crate::utils::path::normalize_path;
use crate::utils::plural::plural_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Building,
    Watching,
    Stopped,
}

/// State shared between the watch thread and its handle.
struct Shared {
    state: Mutex<WatchState>,
    builds: AtomicUsize,
}

impl Shared {
    fn set(&self, state: WatchState) {
        *self.state.lock() = state;
    }
}

/// A configured but not yet started watch session.
pub struct WatchSession {
    context: BuildContext,
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<notify::Event>>,
    shared: Arc<Shared>,
}

impl WatchSession {
    /// Register a recursive watch on `root`.
    pub fn new(context: BuildContext, root: &Path) -> notify::Result<Self> {
        let (tx, events) = channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = tx.send(event);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            context,
            watcher,
            events,
            shared: Arc::new(Shared {
                state: Mutex::new(WatchState::Idle),
                builds: AtomicUsize::new(0),
            }),
        })
    }

    /// Run the initial build, then keep rebuilding on a background thread.
    pub fn start(self) -> WatchHandle {
        let Self {
            context,
            watcher,
            events,
            shared,
        } = self;

        let inputs = run_build(&context, &shared);
        shared.set(WatchState::Watching);

        let (cancel, cancelled) = channel::bounded(1);
        let thread_shared = Arc::clone(&shared);
        let thread = thread::spawn(move || {
            // Dropping the watcher ends the notify stream.
            let _watcher = watcher;
            watch_loop(&context, &events, &cancelled, &thread_shared, inputs);
            thread_shared.set(WatchState::Stopped);
        });

        WatchHandle {
            cancel,
            thread: Mutex::new(Some(thread)),
            shared,
        }
    }
}

/// Handle to a running watch session.
pub struct WatchHandle {
    cancel: Sender<()>,
    thread: Mutex<Option<JoinHandle<()>>>,
    shared: Arc<Shared>,
}

impl WatchHandle {
    /// Ask the session to stop; returns immediately.
    pub fn cancel(&self) {
        let _ = self.cancel.try_send(());
    }

    /// Block until the session has stopped.
    pub fn wait(&self) {
        if let Some(thread) = self.thread.lock().take()
            && thread.join().is_err()
        {
            crate::log!("error"; "watch thread panicked");
            self.shared.set(WatchState::Stopped);
        }
    }

    pub fn state(&self) -> WatchState {
        *self.shared.state.lock()
    }

    /// Builds completed so far, the initial one included.
    pub fn build_count(&self) -> usize {
        self.shared.builds.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("state", &self.state())
            .field("builds", &self.build_count())
            .finish()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
        self.wait();
    }
}

fn watch_loop(
    context: &BuildContext,
    events: &Receiver<notify::Result<notify::Event>>,
    cancelled: &Receiver<()>,
    shared: &Shared,
    mut inputs: FxHashSet<PathBuf>,
) {
    let mut debouncer = Debouncer::new();

    loop {
        crossbeam::select! {
            recv(cancelled) -> _ => break,
            recv(events) -> msg => match msg {
                Ok(Ok(event)) => debouncer.add_event(&event),
                Ok(Err(e)) => crate::log!("watch"; "watcher error: {e}"),
                Err(_) => break,
            },
            default(debouncer.sleep_duration()) => {}
        }

        let Some(changes) = debouncer.take_if_ready() else {
            continue;
        };

        let mut relevant: Vec<_> = changes
            .iter()
            .filter(|(path, _)| inputs.contains(*path))
            .collect();
        if relevant.is_empty() {
            crate::debug!("watch"; "ignored {}", plural_count(changes.len(), "change"));
            continue;
        }
        relevant.sort_by(|a, b| a.0.cmp(b.0));
        for (path, kind) in &relevant {
            crate::log!("watch"; "{}: {}", kind.label(), path.display());
        }

        inputs = run_build(context, shared);
        shared.set(WatchState::Watching);
    }
}

/// Build once, report the outcome, and return the normalized input set.
fn run_build(context: &BuildContext, shared: &Shared) -> FxHashSet<PathBuf> {
    shared.set(WatchState::Building);
    let result = context.rebuild();
    shared.builds.fetch_add(1, Ordering::SeqCst);
    report(&result);

    result.inputs.iter().map(|p| normalize_path(p)).collect()
}

fn report(result: &BuildResult) {
    if !result.errors.is_empty() {
        logger::status_error(
            &format!("build failed with {}", plural_count(result.errors.len(), "error")),
            &result.summary(),
        );
    } else if !result.warnings.is_empty() {
        logger::status_warning(&result.summary());
    } else {
        logger::status_success(&format!(
            "built {}",
            plural_count(result.outputs.len(), "file")
        ));
    }
}
