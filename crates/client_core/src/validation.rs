//! Form input for the create/edit workflows and the shape rules it must pass
//! before anything is sent to the API.

use std::{collections::BTreeMap, fmt};

use shared::{
    domain::{normalize_hire_date, Employee},
    protocol::{CreateEmployeeRequest, UpdateEmployeeRequest},
};
use validator::{Validate, ValidationErrors};

pub const FULL_NAME_MIN: usize = 3;
pub const FULL_NAME_MAX: usize = 150;
pub const DOCUMENT_MIN: usize = 5;
pub const DOCUMENT_MAX: usize = 20;
pub const EMAIL_MAX: usize = 120;

/// Raw values typed into a workflow panel.
///
/// Shape rules run against the trimmed copy, see [`validate_create`].
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct EmployeeInput {
    #[validate(length(min = 3, max = 150))]
    pub full_name: String,
    #[validate(length(min = 5, max = 20))]
    pub document: String,
    #[validate(email, length(max = 120))]
    pub email: String,
    // Format comes from the date picker; only presence is checked.
    #[validate(length(min = 1))]
    pub hire_date: String,
    pub is_active: bool,
}

impl Default for EmployeeInput {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            document: String::new(),
            email: String::new(),
            hire_date: String::new(),
            is_active: true,
        }
    }
}

impl EmployeeInput {
    /// Seeds edit input from a record, cutting the hire date to `yyyy-MM-dd`.
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            full_name: employee.full_name.clone(),
            document: employee.document.clone(),
            email: employee.email.clone(),
            hire_date: normalize_hire_date(&employee.hire_date),
            is_active: employee.is_active,
        }
    }

    fn trimmed(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            document: self.document.trim().to_string(),
            email: self.email.trim().to_string(),
            hire_date: self.hire_date.trim().to_string(),
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    Document,
    Email,
    HireDate,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FullName,
        Field::Document,
        Field::Email,
        Field::HireDate,
    ];

    fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.field_name() == name)
    }

    fn field_name(self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::Document => "document",
            Field::Email => "email",
            Field::HireDate => "hire_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Document => "document",
            Field::Email => "email",
            Field::HireDate => "hireDate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorCode {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
}

impl fmt::Display for FieldErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorCode::Required => f.write_str("is required"),
            FieldErrorCode::TooShort { min } => write!(f, "must have at least {min} characters"),
            FieldErrorCode::TooLong { max } => write!(f, "must have at most {max} characters"),
            FieldErrorCode::InvalidEmail => f.write_str("is not a valid email"),
        }
    }
}

/// Per-field validation failures, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, Vec<FieldErrorCode>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> &[FieldErrorCode] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[FieldErrorCode])> {
        self.0.iter().map(|(field, codes)| (*field, codes.as_slice()))
    }

    fn push(&mut self, field: Field, code: FieldErrorCode) {
        self.0.entry(field).or_default().push(code);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, codes) in self.iter() {
            for code in codes {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{} {code}", field.label())?;
            }
        }
        Ok(())
    }
}

pub fn validate_create(input: &EmployeeInput) -> Result<CreateEmployeeRequest, FieldErrors> {
    let trimmed = input.trimmed();
    trimmed
        .validate()
        .map_err(|errors| field_errors(&trimmed, &errors))?;
    Ok(CreateEmployeeRequest {
        full_name: trimmed.full_name,
        document: trimmed.document,
        email: trimmed.email,
        hire_date: normalize_hire_date(&trimmed.hire_date),
    })
}

pub fn validate_update(input: &EmployeeInput) -> Result<UpdateEmployeeRequest, FieldErrors> {
    let created = validate_create(input)?;
    Ok(UpdateEmployeeRequest {
        full_name: created.full_name,
        document: created.document,
        email: created.email,
        hire_date: created.hire_date,
        is_active: input.is_active,
    })
}

/// Maps validator failures onto per-field codes. An empty value reports
/// only `Required`.
fn field_errors(input: &EmployeeInput, errors: &ValidationErrors) -> FieldErrors {
    let by_field = errors.field_errors();
    let mut mapped = FieldErrors::default();
    for field in Field::ALL {
        let Some(failures) = by_field
            .iter()
            .find(|(name, _)| Field::from_field_name(name) == Some(field))
            .map(|(_, failures)| *failures)
        else {
            continue;
        };

        let value = field_value(input, field);
        if value.is_empty() {
            mapped.push(field, FieldErrorCode::Required);
            continue;
        }
        for failure in failures {
            let code = match &*failure.code {
                "email" => FieldErrorCode::InvalidEmail,
                _ => length_code(field, value.chars().count()),
            };
            mapped.push(field, code);
        }
    }
    mapped
}

fn field_value(input: &EmployeeInput, field: Field) -> &str {
    match field {
        Field::FullName => &input.full_name,
        Field::Document => &input.document,
        Field::Email => &input.email,
        Field::HireDate => &input.hire_date,
    }
}

fn length_code(field: Field, len: usize) -> FieldErrorCode {
    let (min, max) = match field {
        Field::FullName => (FULL_NAME_MIN, FULL_NAME_MAX),
        Field::Document => (DOCUMENT_MIN, DOCUMENT_MAX),
        Field::Email => (0, EMAIL_MAX),
        Field::HireDate => (1, usize::MAX),
    };
    if len < min {
        FieldErrorCode::TooShort { min }
    } else {
        FieldErrorCode::TooLong { max }
    }
}
