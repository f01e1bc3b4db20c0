use std::{future::Future, sync::Arc, time::Duration};

use shared::domain::{Employee, EmployeeId};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod config;
pub mod filter;
pub mod gateway;
pub mod list_state;
pub mod validation;
pub mod workflow;

pub use config::{load_settings, ConfigError, Settings};
pub use gateway::{EmployeeGateway, GatewayError, GatewayOperation, HttpEmployeeGateway};
pub use list_state::{EmployeeListState, ListChange};
pub use validation::{EmployeeInput, Field, FieldErrorCode, FieldErrors};
pub use workflow::{
    CreateWorkflow, EditOpenError, EditWorkflow, SubmitOutcome, SubmitRejected, WorkflowKind,
    WorkflowPhase, WorkflowView,
};

pub const LOAD_FAILED_MESSAGE: &str = "could not load employees";
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    LoadStarted,
    Loaded { count: usize },
    LoadFailed { message: String },
    WorkflowChanged {
        kind: WorkflowKind,
        phase: WorkflowPhase,
        open: bool,
    },
}

/// Everything a presentation layer needs to render the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub displayed: Vec<Employee>,
    pub total: usize,
    pub search_term: String,
    pub loading: bool,
    pub load_error: Option<String>,
    pub create: WorkflowView,
    pub edit: WorkflowView,
}

struct DirectoryState {
    list: EmployeeListState,
    create: CreateWorkflow,
    edit: EditWorkflow,
    /// Loads may overlap; the screen is loading until all of them finish.
    loads_in_flight: usize,
    load_error: Option<String>,
}

/// Drives the list state and both workflows against an [`EmployeeGateway`].
///
/// The state lock is never held across a gateway call, so a load, a create
/// submission and an edit submission can all be in flight together. Each
/// call is bounded by `request_timeout`; a call that overruns keeps running
/// in the background but its result is dropped.
pub struct EmployeeDirectory {
    gateway: Arc<dyn EmployeeGateway>,
    request_timeout: Duration,
    inner: Mutex<DirectoryState>,
    events: broadcast::Sender<DirectoryEvent>,
    list_changes: broadcast::Sender<ListChange>,
}

impl EmployeeDirectory {
    pub fn new(gateway: Arc<dyn EmployeeGateway>, request_timeout: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (list_changes, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            gateway,
            request_timeout,
            inner: Mutex::new(DirectoryState {
                list: EmployeeListState::with_notifier(list_changes.clone()),
                create: CreateWorkflow::new(),
                edit: EditWorkflow::new(),
                loads_in_flight: 0,
                load_error: None,
            }),
            events,
            list_changes,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Arc<Self>, ConfigError> {
        let gateway = HttpEmployeeGateway::from_settings(settings)?;
        Ok(Self::new(Arc::new(gateway), settings.request_timeout))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    /// Fires after every change to the authoritative list or the search term.
    pub fn subscribe_list_changes(&self) -> broadcast::Receiver<ListChange> {
        self.list_changes.subscribe()
    }

    pub async fn snapshot(&self) -> DirectorySnapshot {
        let guard = self.inner.lock().await;
        DirectorySnapshot {
            displayed: guard.list.displayed().to_vec(),
            total: guard.list.authoritative().len(),
            search_term: guard.list.search_term().to_string(),
            loading: guard.loads_in_flight > 0,
            load_error: guard.load_error.clone(),
            create: guard.create.view(),
            edit: guard.edit.view(),
        }
    }

    /// Reloads the full list. On failure the current list is kept and
    /// `load_error` is set.
    pub async fn load(&self) -> Result<usize, GatewayError> {
        {
            let mut guard = self.inner.lock().await;
            guard.loads_in_flight += 1;
        }
        self.emit(DirectoryEvent::LoadStarted);

        let gateway = Arc::clone(&self.gateway);
        let result = self
            .bounded(GatewayOperation::List, async move { gateway.list_all().await })
            .await;

        let mut guard = self.inner.lock().await;
        guard.loads_in_flight = guard.loads_in_flight.saturating_sub(1);
        match result {
            Ok(records) => {
                guard.list.replace_all(records);
                guard.load_error = None;
                let count = guard.list.authoritative().len();
                drop(guard);
                info!(count, "employees loaded");
                self.emit(DirectoryEvent::Loaded { count });
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "failed to load employees; keeping current list");
                let message = err.user_message(LOAD_FAILED_MESSAGE);
                guard.load_error = Some(message.clone());
                drop(guard);
                self.emit(DirectoryEvent::LoadFailed { message });
                Err(err)
            }
        }
    }

    pub async fn set_search_term(&self, term: &str) {
        let mut guard = self.inner.lock().await;
        guard.list.set_search_term(term);
    }

    pub async fn open_create(&self) {
        let mut guard = self.inner.lock().await;
        guard.create.open();
        let view = guard.create.view();
        drop(guard);
        self.emit_workflow(&view);
    }

    pub async fn set_create_input(&self, input: EmployeeInput) -> bool {
        self.inner.lock().await.create.set_input(input)
    }

    pub async fn submit_create(&self) -> Result<SubmitOutcome, SubmitRejected> {
        let payload = {
            let mut guard = self.inner.lock().await;
            let payload = guard.create.begin_submit()?;
            self.emit_workflow(&guard.create.view());
            payload
        };

        let gateway = Arc::clone(&self.gateway);
        let result = self
            .bounded(GatewayOperation::Create, async move {
                gateway.create(payload).await
            })
            .await;

        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        let outcome = state.create.complete(result, &mut state.list);
        let view = state.create.view();
        drop(guard);
        self.emit_workflow(&view);
        Ok(outcome)
    }

    /// Keeps the create panel open with cleared input after a success.
    pub async fn continue_creating(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let changed = guard.create.continue_creating();
        let view = guard.create.view();
        drop(guard);
        if changed {
            self.emit_workflow(&view);
        }
        changed
    }

    pub async fn close_create(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let closed = guard.create.close();
        let view = guard.create.view();
        drop(guard);
        if closed {
            self.emit_workflow(&view);
        }
        closed
    }

    pub async fn open_edit(&self, id: &EmployeeId) -> Result<(), EditOpenError> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        let employee = state
            .list
            .find(id)
            .ok_or_else(|| EditOpenError::UnknownEmployee(id.clone()))?;
        state.edit.open(employee)?;
        let view = state.edit.view();
        drop(guard);
        self.emit_workflow(&view);
        Ok(())
    }

    pub async fn set_edit_input(&self, input: EmployeeInput) -> bool {
        self.inner.lock().await.edit.set_input(input)
    }

    pub async fn submit_edit(&self) -> Result<SubmitOutcome, SubmitRejected> {
        let (id, patch) = {
            let mut guard = self.inner.lock().await;
            let submission = guard.edit.begin_submit()?;
            self.emit_workflow(&guard.edit.view());
            submission
        };

        let gateway = Arc::clone(&self.gateway);
        let call_id = id.clone();
        let call_patch = patch.clone();
        let result = self
            .bounded(GatewayOperation::Update, async move {
                gateway.update(&call_id, call_patch).await
            })
            .await;

        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        let outcome = state.edit.complete(&id, &patch, result, &mut state.list);
        let view = state.edit.view();
        drop(guard);
        self.emit_workflow(&view);
        Ok(outcome)
    }

    pub async fn close_edit(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let closed = guard.edit.close();
        let view = guard.edit.view();
        drop(guard);
        if closed {
            self.emit_workflow(&view);
        }
        closed
    }

    /// Runs `call` on its own task and waits at most `request_timeout`.
    async fn bounded<T, F>(&self, operation: GatewayOperation, call: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, GatewayError>> + Send + 'static,
    {
        let task = tokio::spawn(call);
        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(GatewayError::Transport {
                operation,
                reason: format!("gateway task failed: {join_err}"),
            }),
            Err(_) => {
                warn!(
                    %operation,
                    timeout = ?self.request_timeout,
                    "gateway call timed out; late result will be ignored"
                );
                Err(GatewayError::Timeout {
                    operation,
                    after: self.request_timeout,
                })
            }
        }
    }

    fn emit_workflow(&self, view: &WorkflowView) {
        self.emit(DirectoryEvent::WorkflowChanged {
            kind: view.kind,
            phase: view.phase,
            open: view.open,
        });
    }

    fn emit(&self, event: DirectoryEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
