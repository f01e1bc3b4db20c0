use serde::{Deserialize, Serialize};

/// Body of `POST /Employees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub full_name: String,
    pub document: String,
    pub email: String,
    pub hire_date: String,
}

/// Body of `PUT /Employees/{id}`, also applied locally as the update patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub full_name: String,
    pub document: String,
    pub email: String,
    pub hire_date: String,
    pub is_active: bool,
}
