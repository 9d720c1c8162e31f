//! Task list controller: the single owner of the local task snapshot.
//!
//! Every mutation runs in two phases. The store call is issued first, then
//! the whole collection is re-fetched and swapped in. The local snapshot is
//! never patched, so it can only show state the service has confirmed.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use shared::domain::{normalize_title, Task, TaskId};
use tokio::sync::{broadcast, watch, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{error::TransportError, store::TaskStore};

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListView {
    pub tasks: Vec<Task>,
    /// Number of create flows between submission and the end of their refresh.
    pub pending_submissions: usize,
    /// False until the first fetch has been applied.
    pub loaded: bool,
}

impl TaskListView {
    pub fn pending_submission(&self) -> bool {
        self.pending_submissions > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The service confirmed the call and the snapshot was refreshed.
    Applied,
    /// Blank title; nothing was sent.
    Skipped,
    /// Delete of a record the service no longer has; the snapshot was refreshed.
    AlreadyGone,
    /// The controller was torn down; the result was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationOrdering {
    /// Each intent runs independently; the last refresh to resolve wins.
    #[default]
    Concurrent,
    /// Whole issue-and-refresh flows run one at a time, in arrival order.
    Serialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Load,
    Refresh,
    Create,
    SetCompleted,
    Rename,
    Delete,
}

impl TaskAction {
    fn label(self) -> &'static str {
        match self {
            Self::Load => "load tasks",
            Self::Refresh => "refresh tasks",
            Self::Create => "add task",
            Self::SetCompleted => "update task",
            Self::Rename => "rename task",
            Self::Delete => "delete task",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
}

/// Non-fatal message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub action: TaskAction,
    pub severity: NoticeSeverity,
    pub message: String,
}

enum Issued {
    Confirmed,
    AlreadyGone,
}

struct PendingSubmission<'a> {
    view: &'a watch::Sender<TaskListView>,
}

impl<'a> PendingSubmission<'a> {
    fn raise(view: &'a watch::Sender<TaskListView>) -> Self {
        view.send_modify(|view| view.pending_submissions += 1);
        Self { view }
    }
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        self.view.send_modify(|view| {
            view.pending_submissions = view.pending_submissions.saturating_sub(1)
        });
    }
}

pub struct TaskListController<S: TaskStore> {
    store: S,
    view: watch::Sender<TaskListView>,
    notices: broadcast::Sender<Notice>,
    ordering: MutationOrdering,
    sequencer: Mutex<()>,
    torn_down: AtomicBool,
}

impl<S: TaskStore> TaskListController<S> {
    pub fn new(store: S) -> Arc<Self> {
        Self::with_ordering(store, MutationOrdering::default())
    }

    pub fn with_ordering(store: S, ordering: MutationOrdering) -> Arc<Self> {
        let (view, _) = watch::channel(TaskListView::default());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Arc::new(Self {
            store,
            view,
            notices,
            ordering,
            sequencer: Mutex::new(()),
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> TaskListView {
        self.view.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.view.borrow().tasks.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskListView> {
        self.view.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Detaches the controller from its view. Calls still in flight finish,
    /// but their results are no longer applied or reported.
    pub fn teardown(&self) {
        if !self.torn_down.swap(true, Ordering::AcqRel) {
            info!("tasks: controller torn down");
        }
    }

    /// Initial fetch. The snapshot stays empty until it resolves.
    pub async fn activate(&self) -> Result<MutationOutcome, TransportError> {
        let _turn = self.acquire_turn().await;
        self.reconcile(TaskAction::Load).await
    }

    pub async fn refresh(&self) -> Result<MutationOutcome, TransportError> {
        let _turn = self.acquire_turn().await;
        self.reconcile(TaskAction::Refresh).await
    }

    pub async fn submit(&self, title: &str) -> Result<MutationOutcome, TransportError> {
        let Some(title) = normalize_title(title) else {
            debug!("tasks: blank title ignored");
            return Ok(MutationOutcome::Skipped);
        };
        if self.is_torn_down() {
            return Ok(MutationOutcome::Discarded);
        }

        let _pending = PendingSubmission::raise(&self.view);
        self.run_mutation(TaskAction::Create, async {
            self.store.create_task(&title).await.map(|()| Issued::Confirmed)
        })
        .await
    }

    /// Flips a task away from the completion state the caller displayed.
    pub async fn toggle(
        &self,
        id: &TaskId,
        displayed_completed: bool,
    ) -> Result<MutationOutcome, TransportError> {
        self.set_completed(id, !displayed_completed).await
    }

    pub async fn set_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> Result<MutationOutcome, TransportError> {
        self.run_mutation(TaskAction::SetCompleted, async {
            self.store
                .set_completed(id, completed)
                .await
                .map(|()| Issued::Confirmed)
        })
        .await
    }

    pub async fn rename(&self, id: &TaskId, title: &str) -> Result<MutationOutcome, TransportError> {
        let Some(title) = normalize_title(title) else {
            debug!(task_id = %id, "tasks: blank rename ignored");
            return Ok(MutationOutcome::Skipped);
        };
        self.run_mutation(TaskAction::Rename, async {
            self.store
                .rename_task(id, &title)
                .await
                .map(|()| Issued::Confirmed)
        })
        .await
    }

    /// Deletes a task. A not-found answer means the record is already
    /// absent and is treated as success; any other failure is reported.
    pub async fn delete(&self, id: &TaskId) -> Result<MutationOutcome, TransportError> {
        self.run_mutation(TaskAction::Delete, async {
            match self.store.delete_task(id).await {
                Ok(()) => Ok(Issued::Confirmed),
                Err(err) if err.is_not_found() => {
                    info!(task_id = %id, "tasks: delete target already gone");
                    Ok(Issued::AlreadyGone)
                }
                Err(err) => Err(err),
            }
        })
        .await
    }

    async fn acquire_turn(&self) -> Option<MutexGuard<'_, ()>> {
        match self.ordering {
            MutationOrdering::Concurrent => None,
            MutationOrdering::Serialized => Some(self.sequencer.lock().await),
        }
    }

    async fn run_mutation<F>(
        &self,
        action: TaskAction,
        issue: F,
    ) -> Result<MutationOutcome, TransportError>
    where
        F: Future<Output = Result<Issued, TransportError>>,
    {
        let _turn = self.acquire_turn().await;
        if self.is_torn_down() {
            return Ok(MutationOutcome::Discarded);
        }

        let issued = match issue.await {
            Ok(issued) => issued,
            Err(err) => {
                self.report_failure(action, &err);
                return Err(err);
            }
        };

        let outcome = self.reconcile(action).await?;
        match (issued, outcome) {
            (Issued::AlreadyGone, MutationOutcome::Applied) => {
                self.publish(Notice {
                    action,
                    severity: NoticeSeverity::Info,
                    message: "task was already removed".to_string(),
                });
                Ok(MutationOutcome::AlreadyGone)
            }
            (_, outcome) => Ok(outcome),
        }
    }

    async fn reconcile(&self, action: TaskAction) -> Result<MutationOutcome, TransportError> {
        if self.is_torn_down() {
            return Ok(MutationOutcome::Discarded);
        }

        let tasks = match self.store.list_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                self.report_failure(action, &err);
                return Err(err);
            }
        };

        if self.is_torn_down() {
            debug!(action = action.label(), "tasks: late refresh discarded");
            return Ok(MutationOutcome::Discarded);
        }

        let count = tasks.len();
        self.view.send_modify(|view| {
            view.tasks = tasks;
            view.loaded = true;
        });
        debug!(action = action.label(), count, "tasks: snapshot replaced");
        Ok(MutationOutcome::Applied)
    }

    fn report_failure(&self, action: TaskAction, err: &TransportError) {
        if self.is_torn_down() {
            return;
        }
        warn!(action = action.label(), error = %err, "tasks: remote call failed");
        self.publish(Notice {
            action,
            severity: NoticeSeverity::Warning,
            message: format!("could not {}: {err}", action.label()),
        });
    }

    fn publish(&self, notice: Notice) {
        if self.is_torn_down() {
            return;
        }
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
