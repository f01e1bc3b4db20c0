//! Authoritative employee list plus the filtered view derived from it.

use shared::{
    domain::{Employee, EmployeeId},
    protocol::UpdateEmployeeRequest,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::filter::filter_employees;

/// Which operation last changed the list state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    Replaced { count: usize },
    Inserted { id: EmployeeId },
    Updated { id: EmployeeId },
    Filtered { term: String },
}

/// Holds the authoritative list and the displayed subset.
///
/// `displayed` is only ever rederived from `authoritative` and the current
/// search term; nothing writes to it directly.
#[derive(Debug)]
pub struct EmployeeListState {
    authoritative: Vec<Employee>,
    displayed: Vec<Employee>,
    search_term: String,
    notifier: Option<broadcast::Sender<ListChange>>,
}

impl Default for EmployeeListState {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeListState {
    pub fn new() -> Self {
        Self {
            authoritative: Vec::new(),
            displayed: Vec::new(),
            search_term: String::new(),
            notifier: None,
        }
    }

    /// Publishes a [`ListChange`] on `notifier` after every mutation.
    pub fn with_notifier(notifier: broadcast::Sender<ListChange>) -> Self {
        Self {
            notifier: Some(notifier),
            ..Self::new()
        }
    }

    pub fn authoritative(&self) -> &[Employee] {
        &self.authoritative
    }

    pub fn displayed(&self) -> &[Employee] {
        &self.displayed
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn find(&self, id: &EmployeeId) -> Option<&Employee> {
        self.authoritative.iter().find(|employee| &employee.id == id)
    }

    /// Replaces the whole authoritative list. `None` clears it.
    pub fn replace_all(&mut self, records: Option<Vec<Employee>>) {
        self.authoritative = records.unwrap_or_default();
        let count = self.authoritative.len();
        self.refresh(ListChange::Replaced { count });
    }

    /// Prepends a freshly created record. The caller guarantees its id is new.
    pub fn insert_front(&mut self, record: Employee) {
        let id = record.id.clone();
        self.authoritative.insert(0, record);
        self.refresh(ListChange::Inserted { id });
    }

    /// Patches the first record matching `id` in place.
    ///
    /// Returns `false` without touching the list when no record matches; the
    /// remote update already succeeded, so the miss is only logged.
    pub fn replace_by_id(&mut self, id: &EmployeeId, patch: &UpdateEmployeeRequest) -> bool {
        let Some(position) = self
            .authoritative
            .iter()
            .position(|employee| &employee.id == id)
        else {
            warn!(employee_id = %id, "updated employee is not in the local list; skipping local patch");
            return false;
        };

        let patched = self.authoritative[position].patched(patch);
        self.authoritative[position] = patched;
        self.refresh(ListChange::Updated { id: id.clone() });
        true
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        let term = self.search_term.clone();
        self.refresh(ListChange::Filtered { term });
    }

    fn refresh(&mut self, change: ListChange) {
        self.displayed = filter_employees(&self.authoritative, &self.search_term);
        debug!(
            ?change,
            total = self.authoritative.len(),
            displayed = self.displayed.len(),
            "employee list state changed"
        );
        if let Some(notifier) = &self.notifier {
            // No subscribers is fine.
            let _ = notifier.send(change);
        }
    }
}

#[cfg(test)]
#[path = "tests/list_state_tests.rs"]
mod tests;
