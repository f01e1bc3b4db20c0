//! Remote employee API: the gateway seam and its reqwest implementation.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Employee, EmployeeId},
    error::ApiErrorBody,
    protocol::{CreateEmployeeRequest, UpdateEmployeeRequest},
};
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, Settings};

const EMPLOYEES_COLLECTION: &str = "Employees";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    List,
    Create,
    Update,
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GatewayOperation::List => "list employees",
            GatewayOperation::Create => "create employee",
            GatewayOperation::Update => "update employee",
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: GatewayOperation,
        after: Duration,
    },
    #[error("{operation} request failed: {reason}")]
    Transport {
        operation: GatewayOperation,
        reason: String,
    },
    #[error("{operation} returned status {status}")]
    Status {
        operation: GatewayOperation,
        status: u16,
        message: Option<String>,
    },
    #[error("{operation} returned an unreadable body: {reason}")]
    Decode {
        operation: GatewayOperation,
        reason: String,
    },
}

impl GatewayError {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            GatewayError::Timeout { operation, .. }
            | GatewayError::Transport { operation, .. }
            | GatewayError::Status { operation, .. }
            | GatewayError::Decode { operation, .. } => *operation,
        }
    }

    /// Message to show a user: the server's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            GatewayError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Network operations against the employees collection.
#[async_trait]
pub trait EmployeeGateway: Send + Sync {
    /// Fetches every employee. `None` means the API answered with no list.
    async fn list_all(&self) -> Result<Option<Vec<Employee>>, GatewayError>;
    async fn create(&self, payload: CreateEmployeeRequest) -> Result<Employee, GatewayError>;
    async fn update(
        &self,
        id: &EmployeeId,
        payload: UpdateEmployeeRequest,
    ) -> Result<(), GatewayError>;
}

pub struct HttpEmployeeGateway {
    http: Client,
    collection_url: Url,
}

impl HttpEmployeeGateway {
    pub fn new(api_base_url: &Url) -> Result<Self, ConfigError> {
        Ok(Self {
            http: Client::new(),
            collection_url: collection_url(api_base_url)?,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::new(&settings.api_base_url)
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn member_url(&self, id: &EmployeeId) -> Url {
        let mut url = self.collection_url.clone();
        // collection_url is validated as a base URL on construction.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id.as_str());
        }
        url
    }
}

fn collection_url(api_base_url: &Url) -> Result<Url, ConfigError> {
    let mut url = api_base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ConfigError::InvalidBaseUrl {
            value: api_base_url.to_string(),
            reason: "url cannot be used as a base".into(),
        })?
        .pop_if_empty()
        .push(EMPLOYEES_COLLECTION);
    Ok(url)
}

#[async_trait]
impl EmployeeGateway for HttpEmployeeGateway {
    async fn list_all(&self) -> Result<Option<Vec<Employee>>, GatewayError> {
        let operation = GatewayOperation::List;
        let res = self
            .http
            .get(self.collection_url.clone())
            .send()
            .await
            .map_err(|err| transport(operation, err))?;
        let res = ensure_success(operation, res).await?;
        decode_json(operation, res).await
    }

    async fn create(&self, payload: CreateEmployeeRequest) -> Result<Employee, GatewayError> {
        let operation = GatewayOperation::Create;
        let res = self
            .http
            .post(self.collection_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| transport(operation, err))?;
        let res = ensure_success(operation, res).await?;
        decode_json(operation, res).await
    }

    async fn update(
        &self,
        id: &EmployeeId,
        payload: UpdateEmployeeRequest,
    ) -> Result<(), GatewayError> {
        let operation = GatewayOperation::Update;
        let res = self
            .http
            .put(self.member_url(id))
            .json(&payload)
            .send()
            .await
            .map_err(|err| transport(operation, err))?;
        ensure_success(operation, res).await?;
        Ok(())
    }
}

fn transport(operation: GatewayOperation, err: reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        operation,
        reason: err.to_string(),
    }
}

async fn ensure_success(
    operation: GatewayOperation,
    res: Response,
) -> Result<Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.bytes().await.unwrap_or_default();
    Err(GatewayError::Status {
        operation,
        status: status.as_u16(),
        message: ApiErrorBody::message_from_bytes(&body),
    })
}

async fn decode_json<T: DeserializeOwned>(
    operation: GatewayOperation,
    res: Response,
) -> Result<T, GatewayError> {
    let body = res.bytes().await.map_err(|err| transport(operation, err))?;
    serde_json::from_slice(&body).map_err(|err| GatewayError::Decode {
        operation,
        reason: err.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
