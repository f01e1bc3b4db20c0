//! Create and edit workflows: `Idle -> Submitting -> {Success, Failed}`.
//!
//! Both are sans-IO. `begin_submit` applies the guards and hands back the
//! payload to send; the caller performs the gateway call and feeds the
//! result to `complete`, which reconciles the list state.

use shared::{
    domain::{Employee, EmployeeId},
    protocol::{CreateEmployeeRequest, UpdateEmployeeRequest},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    gateway::GatewayError,
    list_state::EmployeeListState,
    validation::{validate_create, validate_update, EmployeeInput, FieldErrors},
};

pub const CREATE_FAILED_MESSAGE: &str = "could not register employee";
pub const UPDATE_FAILED_MESSAGE: &str = "could not update employee";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    Submitting,
    /// Create only: waiting for `continue_creating` or `close`.
    Success {
        continue_possible: bool,
    },
    /// The last submission failed; the panel stays open for a retry or cancel.
    Failed,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("workflow is not open")]
    NotOpen,
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("previous submission succeeded; continue or close first")]
    AwaitingConfirmation,
    #[error("invalid input: {0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditOpenError {
    #[error("employee {0} is not loaded")]
    UnknownEmployee(EmployeeId),
    #[error("edit workflow is submitting")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created {
        employee: Employee,
        continue_possible: bool,
    },
    Updated {
        id: EmployeeId,
        /// `false` when the record was not in the local list.
        applied_locally: bool,
    },
    Failed {
        message: String,
    },
}

/// Read-only copy of a workflow for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub kind: WorkflowKind,
    pub open: bool,
    pub phase: WorkflowPhase,
    pub input: EmployeeInput,
    pub error: Option<String>,
    pub field_errors: FieldErrors,
    /// Set when a submit was blocked by validation so every field shows its errors.
    pub fields_marked: bool,
    pub editing_id: Option<EmployeeId>,
}

#[derive(Debug, Clone)]
struct FormPanel {
    open: bool,
    phase: WorkflowPhase,
    input: EmployeeInput,
    error: Option<String>,
    field_errors: FieldErrors,
    fields_marked: bool,
}

impl FormPanel {
    fn closed() -> Self {
        Self {
            open: false,
            phase: WorkflowPhase::Idle,
            input: EmployeeInput::default(),
            error: None,
            field_errors: FieldErrors::default(),
            fields_marked: false,
        }
    }

    fn opened(input: EmployeeInput) -> Self {
        Self {
            open: true,
            input,
            ..Self::closed()
        }
    }

    fn is_submitting(&self) -> bool {
        self.phase == WorkflowPhase::Submitting
    }

    fn set_input(&mut self, input: EmployeeInput) -> bool {
        if !self.open || self.is_submitting() {
            return false;
        }
        self.input = input;
        true
    }

    fn check_submittable(&self) -> Result<(), SubmitRejected> {
        if !self.open {
            return Err(SubmitRejected::NotOpen);
        }
        match self.phase {
            WorkflowPhase::Submitting => Err(SubmitRejected::AlreadySubmitting),
            WorkflowPhase::Success { .. } => Err(SubmitRejected::AwaitingConfirmation),
            WorkflowPhase::Idle | WorkflowPhase::Failed => Ok(()),
        }
    }

    fn reject_invalid(&mut self, errors: FieldErrors) -> SubmitRejected {
        self.field_errors = errors.clone();
        self.fields_marked = true;
        SubmitRejected::Invalid(errors)
    }

    fn start_submitting(&mut self) {
        self.field_errors = FieldErrors::default();
        self.fields_marked = false;
        self.error = None;
        self.phase = WorkflowPhase::Submitting;
    }

    fn fail(&mut self, err: &GatewayError, fallback: &str) -> String {
        let message = err.user_message(fallback);
        self.error = Some(message.clone());
        self.phase = WorkflowPhase::Failed;
        message
    }

    fn view(&self, kind: WorkflowKind, editing_id: Option<EmployeeId>) -> WorkflowView {
        WorkflowView {
            kind,
            open: self.open,
            phase: self.phase,
            input: self.input.clone(),
            error: self.error.clone(),
            field_errors: self.field_errors.clone(),
            fields_marked: self.fields_marked,
            editing_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateWorkflow {
    panel: FormPanel,
}

impl Default for CreateWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateWorkflow {
    pub fn new() -> Self {
        Self {
            panel: FormPanel::closed(),
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.panel.phase
    }

    pub fn is_open(&self) -> bool {
        self.panel.open
    }

    pub fn view(&self) -> WorkflowView {
        self.panel.view(WorkflowKind::Create, None)
    }

    /// Opens an empty panel. Ignored while a panel is already open.
    pub fn open(&mut self) {
        if self.panel.open {
            return;
        }
        self.panel = FormPanel::opened(EmployeeInput::default());
    }

    pub fn set_input(&mut self, input: EmployeeInput) -> bool {
        self.panel.set_input(input)
    }

    pub fn begin_submit(&mut self) -> Result<CreateEmployeeRequest, SubmitRejected> {
        self.panel.check_submittable()?;
        let payload = validate_create(&self.panel.input)
            .map_err(|errors| self.panel.reject_invalid(errors))?;
        self.panel.start_submitting();
        debug!("create workflow submitting");
        Ok(payload)
    }

    /// Applies the gateway result of the in-flight submission.
    pub fn complete(
        &mut self,
        result: Result<Employee, GatewayError>,
        list: &mut EmployeeListState,
    ) -> SubmitOutcome {
        if !self.panel.is_submitting() {
            warn!(phase = ?self.panel.phase, "create completion without a submission in flight");
        }
        match result {
            Ok(employee) => {
                info!(employee_id = %employee.id, "employee registered");
                list.insert_front(employee.clone());
                self.panel.phase = WorkflowPhase::Success {
                    continue_possible: true,
                };
                SubmitOutcome::Created {
                    employee,
                    continue_possible: true,
                }
            }
            Err(err) => {
                warn!(error = %err, "employee registration failed");
                let message = self.panel.fail(&err, CREATE_FAILED_MESSAGE);
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// After a success: clears the input and stays open for another record.
    pub fn continue_creating(&mut self) -> bool {
        if !matches!(self.panel.phase, WorkflowPhase::Success { .. }) {
            return false;
        }
        self.panel = FormPanel::opened(EmployeeInput::default());
        true
    }

    /// Closes and discards input. A no-op while submitting.
    pub fn close(&mut self) -> bool {
        if self.panel.is_submitting() {
            return false;
        }
        self.panel = FormPanel::closed();
        true
    }
}

#[derive(Debug, Clone)]
pub struct EditWorkflow {
    panel: FormPanel,
    editing_id: Option<EmployeeId>,
}

impl Default for EditWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl EditWorkflow {
    pub fn new() -> Self {
        Self {
            panel: FormPanel::closed(),
            editing_id: None,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.panel.phase
    }

    pub fn is_open(&self) -> bool {
        self.panel.open
    }

    pub fn editing_id(&self) -> Option<&EmployeeId> {
        self.editing_id.as_ref()
    }

    pub fn view(&self) -> WorkflowView {
        self.panel.view(WorkflowKind::Edit, self.editing_id.clone())
    }

    /// Seeds the panel from `employee` and pins its id for the submission.
    pub fn open(&mut self, employee: &Employee) -> Result<(), EditOpenError> {
        if self.panel.is_submitting() {
            return Err(EditOpenError::Busy);
        }
        self.panel = FormPanel::opened(EmployeeInput::from_employee(employee));
        self.editing_id = Some(employee.id.clone());
        Ok(())
    }

    pub fn set_input(&mut self, input: EmployeeInput) -> bool {
        self.panel.set_input(input)
    }

    pub fn begin_submit(
        &mut self,
    ) -> Result<(EmployeeId, UpdateEmployeeRequest), SubmitRejected> {
        self.panel.check_submittable()?;
        let id = self.editing_id.clone().ok_or(SubmitRejected::NotOpen)?;
        let payload = validate_update(&self.panel.input)
            .map_err(|errors| self.panel.reject_invalid(errors))?;
        self.panel.start_submitting();
        debug!(employee_id = %id, "edit workflow submitting");
        Ok((id, payload))
    }

    /// Applies the gateway result for `id`, the id captured by `begin_submit`.
    pub fn complete(
        &mut self,
        id: &EmployeeId,
        patch: &UpdateEmployeeRequest,
        result: Result<(), GatewayError>,
        list: &mut EmployeeListState,
    ) -> SubmitOutcome {
        if !self.panel.is_submitting() {
            warn!(phase = ?self.panel.phase, "edit completion without a submission in flight");
        }
        match result {
            Ok(()) => {
                info!(employee_id = %id, "employee updated");
                let applied_locally = list.replace_by_id(id, patch);
                self.panel = FormPanel::closed();
                self.editing_id = None;
                SubmitOutcome::Updated {
                    id: id.clone(),
                    applied_locally,
                }
            }
            Err(err) => {
                warn!(employee_id = %id, error = %err, "employee update failed");
                let message = self.panel.fail(&err, UPDATE_FAILED_MESSAGE);
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Closes and discards input. A no-op while submitting.
    pub fn close(&mut self) -> bool {
        if self.panel.is_submitting() {
            return false;
        }
        self.panel = FormPanel::closed();
        self.editing_id = None;
        true
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
