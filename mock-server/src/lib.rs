use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// What `/echo` saw, returned as the response body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Store {
    items: HashMap<u64, Item>,
    next_id: u64,
}

impl Store {
    fn insert(&mut self, name: String, tags: Vec<String>) -> Item {
        self.next_id += 1;
        let item = Item {
            id: self.next_id,
            name,
            tags,
        };
        self.items.insert(item.id, item.clone());
        item
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_items(Vec::new())
}

/// App pre-loaded with `items`. New items get ids above the largest seeded id.
pub fn app_with_items(items: Vec<Item>) -> Router {
    let mut store = Store::default();
    for item in items {
        store.next_id = store.next_id.max(item.id);
        store.items.insert(item.id, item);
    }
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item))
        .route("/echo", any(echo))
        .route("/plain", get(plain))
        .route("/status/{code}", get(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_app(listener, app()).await
}

pub async fn run_app(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let store = db.read().await;
    let mut items: Vec<Item> = store.items.values().cloned().collect();
    items.sort_by_key(|item| item.id);
    Json(items)
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let item = db.write().await.insert(input.name, input.tags);
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, (StatusCode, Json<Value>)> {
    let store = db.read().await;
    store.items.get(&id).cloned().map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("item {id} not found") })),
        )
    })
}

async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Echo>, StatusCode> {
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?)
    };
    let headers = headers
        .iter()
        .map(|(k, v)| {
            let value = String::from_utf8_lossy(v.as_bytes()).into_owned();
            (k.as_str().to_string(), value)
        })
        .collect();
    Ok(Json(Echo {
        method: method.as_str().to_string(),
        query,
        headers,
        body,
    }))
}

async fn plain() -> &'static str {
    "this is not json"
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    let code = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (code, Json(json!({ "status": code.as_u16() })))
}
