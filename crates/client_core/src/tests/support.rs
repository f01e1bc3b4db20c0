use shared::domain::{Employee, EmployeeId};

use crate::validation::EmployeeInput;

pub fn employee(id: &str, full_name: &str, document: &str, email: &str) -> Employee {
    Employee {
        id: EmployeeId::new(id),
        full_name: full_name.to_string(),
        document: document.to_string(),
        email: email.to_string(),
        hire_date: "2020-01-01".to_string(),
        is_active: true,
    }
}

pub fn ana() -> Employee {
    employee("1", "Ana Silva", "111", "ana@x.com")
}

pub fn valid_input() -> EmployeeInput {
    EmployeeInput {
        full_name: "Bo Lindqvist".into(),
        document: "12345678".into(),
        email: "bo@x.com".into(),
        hire_date: "2021-03-04".into(),
        is_active: true,
    }
}
