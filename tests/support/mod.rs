#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chore_board::{ApiClient, ClientConfig};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::Mutex, task::JoinHandle};

type Reply<T> = Result<T, (StatusCode, String)>;

/// In-memory stand-in for the remote chores API.
pub struct StubData {
    pub roommates: Vec<Value>,
    pub tasks: Vec<Value>,
    pub task_types: Vec<Value>,
    pub analytics: Value,
    pub hits: HashMap<String, usize>,
    pub posted: Vec<(String, Value)>,
    /// Routes such as `"GET /tasks"` that always answer 500.
    pub failing: HashSet<String>,
    /// Routes that answer 500 for the next N calls.
    pub fail_next: HashMap<String, usize>,
    pub reject_unnamed_tasks: bool,
    pub get_delay: Duration,
    pub post_delay: Duration,
}

impl Default for StubData {
    fn default() -> Self {
        Self {
            roommates: Vec::new(),
            tasks: Vec::new(),
            task_types: Vec::new(),
            analytics: json!({}),
            hits: HashMap::new(),
            posted: Vec::new(),
            failing: HashSet::new(),
            fail_next: HashMap::new(),
            reject_unnamed_tasks: false,
            get_delay: Duration::ZERO,
            post_delay: Duration::ZERO,
        }
    }
}

impl StubData {
    /// Alice and one task she did, the fixture most tests start from.
    pub fn seeded() -> Self {
        Self {
            roommates: vec![json!({ "id": "1", "name": "Alice" })],
            tasks: vec![json!({
                "id": "t1",
                "name": "Dishes",
                "dateCompleted": "2024-03-05",
                "completedBy": "1"
            })],
            task_types: vec![json!({ "name": "Dishes" }), json!({ "name": "Trash" })],
            ..Self::default()
        }
    }
}

type Shared = Arc<Mutex<StubData>>;

pub struct Stub {
    pub base_url: String,
    pub data: Shared,
    server: JoinHandle<()>,
}

impl Drop for Stub {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl Stub {
    pub async fn spawn(data: StubData) -> Self {
        let data = Arc::new(Mutex::new(data));
        let app = Router::new()
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/roommates", get(list_roommates).post(create_roommate))
            .route("/task-types", get(list_task_types).post(create_task_type))
            .route("/analytics", get(analytics))
            .with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub api");
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub api stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            data,
            server,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(ClientConfig::new(&self.base_url)).unwrap()
    }

    pub async fn hits(&self, route: &str) -> usize {
        self.data.lock().await.hits.get(route).copied().unwrap_or(0)
    }

    pub async fn posted(&self) -> Vec<(String, Value)> {
        self.data.lock().await.posted.clone()
    }
}

async fn enter(stub: &Shared, route: &str) -> Reply<()> {
    let delay = {
        let mut data = stub.lock().await;
        *data.hits.entry(route.to_string()).or_default() += 1;
        if data.failing.contains(route) {
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "stub failure".to_string()));
        }
        if let Some(remaining) = data.fail_next.get_mut(route) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err((StatusCode::INTERNAL_SERVER_ERROR, "stub failure".to_string()));
            }
        }
        if route.starts_with("GET") {
            data.get_delay
        } else {
            data.post_delay
        }
    };
    tokio::time::sleep(delay).await;
    Ok(())
}

async fn list_tasks(State(stub): State<Shared>) -> Reply<Json<Value>> {
    enter(&stub, "GET /tasks").await?;
    Ok(Json(Value::Array(stub.lock().await.tasks.clone())))
}

async fn create_task(State(stub): State<Shared>, Json(body): Json<Value>) -> Reply<(StatusCode, Json<Value>)> {
    enter(&stub, "POST /tasks").await?;
    let mut data = stub.lock().await;
    data.posted.push(("POST /tasks".to_string(), body.clone()));
    if data.reject_unnamed_tasks && body["name"].as_str().unwrap_or_default().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "name is required".to_string()));
    }
    let mut task = body;
    task["id"] = json!(format!("t{}", data.tasks.len() + 1));
    data.tasks.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_roommates(State(stub): State<Shared>) -> Reply<Json<Value>> {
    enter(&stub, "GET /roommates").await?;
    Ok(Json(Value::Array(stub.lock().await.roommates.clone())))
}

async fn create_roommate(State(stub): State<Shared>, Json(body): Json<Value>) -> Reply<(StatusCode, Json<Value>)> {
    enter(&stub, "POST /roommates").await?;
    let mut data = stub.lock().await;
    data.posted.push(("POST /roommates".to_string(), body.clone()));
    let roommate = json!({
        "id": (data.roommates.len() + 1).to_string(),
        "name": body["name"].clone()
    });
    data.roommates.push(roommate.clone());
    Ok((StatusCode::CREATED, Json(roommate)))
}

async fn list_task_types(State(stub): State<Shared>) -> Reply<Json<Value>> {
    enter(&stub, "GET /task-types").await?;
    Ok(Json(Value::Array(stub.lock().await.task_types.clone())))
}

async fn create_task_type(State(stub): State<Shared>, Json(body): Json<Value>) -> Reply<(StatusCode, Json<Value>)> {
    enter(&stub, "POST /task-types").await?;
    let mut data = stub.lock().await;
    data.posted.push(("POST /task-types".to_string(), body.clone()));
    let task_type = json!({ "name": body["name"].clone() });
    data.task_types.push(task_type.clone());
    Ok((StatusCode::CREATED, Json(task_type)))
}

async fn analytics(State(stub): State<Shared>) -> Reply<Json<Value>> {
    enter(&stub, "GET /analytics").await?;
    Ok(Json(stub.lock().await.analytics.clone()))
}
