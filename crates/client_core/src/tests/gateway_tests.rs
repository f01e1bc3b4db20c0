use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct ServerState {
    created: Arc<Mutex<Vec<Value>>>,
    updated: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn list_employees() -> Json<Value> {
    Json(json!([
        {
            "id": "1",
            "fullName": "Ana Silva",
            "document": "11122",
            "email": "ana@x.com",
            "hireDate": "2020-01-01T00:00:00",
            "isActive": true
        },
        {
            "id": 2,
            "fullName": "Bo Lind",
            "document": "22233",
            "email": "bo@x.com",
            "hireDate": "2021-02-03",
            "isActive": false
        }
    ]))
}

async fn create_employee(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if body["document"] == "00000" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "document already registered" })),
        );
    }
    state.created.lock().await.push(body.clone());
    let mut created = body;
    created["id"] = json!("42");
    created["isActive"] = json!(true);
    (StatusCode::CREATED, Json(created))
}

async fn update_employee(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    if id == "404" {
        return StatusCode::NOT_FOUND;
    }
    state.updated.lock().await.push((id, body));
    StatusCode::NO_CONTENT
}

async fn spawn_employees_server() -> anyhow::Result<(Url, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/Employees", get(list_employees).post(create_employee))
        .route("/api/Employees/:id", put(update_employee))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((Url::parse(&format!("http://{addr}/api"))?, state))
}

fn create_payload(document: &str) -> CreateEmployeeRequest {
    CreateEmployeeRequest {
        full_name: "Carla Dias".into(),
        document: document.into(),
        email: "carla@x.com".into(),
        hire_date: "2022-07-01".into(),
    }
}

#[test]
fn collection_url_appends_employees_segment() {
    for base in ["http://localhost:5196/api", "http://localhost:5196/api/"] {
        let gateway = HttpEmployeeGateway::new(&Url::parse(base).expect("url")).expect("gateway");
        assert_eq!(
            gateway.collection_url().as_str(),
            "http://localhost:5196/api/Employees"
        );
    }
}

#[test]
fn member_url_escapes_identifier() {
    let gateway =
        HttpEmployeeGateway::new(&Url::parse("http://localhost:5196/api").expect("url"))
            .expect("gateway");
    assert_eq!(
        gateway.member_url(&EmployeeId::new("a/b c")).as_str(),
        "http://localhost:5196/api/Employees/a%2Fb%20c"
    );
}

#[test]
fn user_message_prefers_server_text() {
    let with_message = GatewayError::Status {
        operation: GatewayOperation::Update,
        status: 422,
        message: Some("email already in use".into()),
    };
    let without_message = GatewayError::Status {
        operation: GatewayOperation::Update,
        status: 500,
        message: None,
    };
    assert_eq!(with_message.user_message("fallback"), "email already in use");
    assert_eq!(without_message.user_message("fallback"), "fallback");
    assert_eq!(without_message.operation(), GatewayOperation::Update);
}

#[tokio::test]
async fn list_all_decodes_mixed_id_kinds() {
    let (base, _state) = spawn_employees_server().await.expect("spawn server");
    let gateway = HttpEmployeeGateway::new(&base).expect("gateway");

    let employees = gateway
        .list_all()
        .await
        .expect("list")
        .expect("non-null list");

    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].id, EmployeeId::new("1"));
    assert_eq!(employees[1].id, EmployeeId::new("2"));
    assert!(!employees[1].is_active);
}

#[tokio::test]
async fn create_posts_payload_and_returns_assigned_id() {
    let (base, state) = spawn_employees_server().await.expect("spawn server");
    let gateway = HttpEmployeeGateway::new(&base).expect("gateway");

    let created = gateway
        .create(create_payload("55555"))
        .await
        .expect("create");

    assert_eq!(created.id, EmployeeId::new("42"));
    assert_eq!(created.full_name, "Carla Dias");
    let posted = state.created.lock().await;
    assert_eq!(
        posted.as_slice(),
        &[json!({
            "fullName": "Carla Dias",
            "document": "55555",
            "email": "carla@x.com",
            "hireDate": "2022-07-01"
        })]
    );
}

#[tokio::test]
async fn create_failure_surfaces_server_message() {
    let (base, _state) = spawn_employees_server().await.expect("spawn server");
    let gateway = HttpEmployeeGateway::new(&base).expect("gateway");

    let err = gateway
        .create(create_payload("00000"))
        .await
        .expect_err("conflict");

    assert_eq!(
        err,
        GatewayError::Status {
            operation: GatewayOperation::Create,
            status: 409,
            message: Some("document already registered".into()),
        }
    );
}

#[tokio::test]
async fn update_puts_full_payload_to_member_url() {
    let (base, state) = spawn_employees_server().await.expect("spawn server");
    let gateway = HttpEmployeeGateway::new(&base).expect("gateway");

    gateway
        .update(
            &EmployeeId::new("7"),
            UpdateEmployeeRequest {
                full_name: "Ana Silva".into(),
                document: "11122".into(),
                email: "ana@x.com".into(),
                hire_date: "2020-01-01".into(),
                is_active: false,
            },
        )
        .await
        .expect("update");

    let updated = state.updated.lock().await;
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, "7");
    assert_eq!(updated[0].1["isActive"], json!(false));
    assert_eq!(updated[0].1["hireDate"], json!("2020-01-01"));
}

#[tokio::test]
async fn update_of_missing_record_is_a_status_error_without_message() {
    let (base, _state) = spawn_employees_server().await.expect("spawn server");
    let gateway = HttpEmployeeGateway::new(&base).expect("gateway");

    let err = gateway
        .update(
            &EmployeeId::new("404"),
            UpdateEmployeeRequest {
                full_name: "Ana Silva".into(),
                document: "11122".into(),
                email: "ana@x.com".into(),
                hire_date: "2020-01-01".into(),
                is_active: true,
            },
        )
        .await
        .expect_err("not found");

    assert!(matches!(
        err,
        GatewayError::Status {
            status: 404,
            message: None,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = Url::parse(&format!("http://{addr}/api")).expect("url");
    let gateway = HttpEmployeeGateway::new(&base).expect("gateway");

    let err = gateway.list_all().await.expect_err("refused");
    assert!(matches!(
        err,
        GatewayError::Transport {
            operation: GatewayOperation::List,
            ..
        }
    ));
}
