//! In-memory stand-in for the subset of the Notion API the client uses.
//!
//! Routes live under `/v1`. Every request must carry the workspace's bearer
//! token and a `Notion-Version` header. Failures are answered with
//! Notion-shaped error payloads (`{"object": "error", ...}`), never bare
//! status codes.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// Largest page a query may return, matching the real API.
pub const MAX_PAGE_SIZE: usize = 100;

/// Property kinds the mock recognizes when tagging incoming fragments.
const PROPERTY_KINDS: [&str; 9] = [
    "title",
    "rich_text",
    "number",
    "select",
    "multi_select",
    "date",
    "checkbox",
    "files",
    "url",
];

/// State behind one mock workspace.
#[derive(Debug)]
pub struct Workspace {
    token: String,
    page_size: usize,
    databases: HashMap<String, Value>,
    // Creation order doubles as query order.
    pages: Vec<Value>,
    blocks: HashMap<String, Value>,
}

pub type Db = Arc<RwLock<Workspace>>;

impl Workspace {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            page_size: MAX_PAGE_SIZE,
            databases: HashMap::new(),
            pages: Vec::new(),
            blocks: HashMap::new(),
        }
    }

    /// Default number of rows per query page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn insert_database(&mut self, id: &str, title: &str) -> Value {
        let database = json!({
            "object": "database",
            "id": id,
            "title": [{"type": "text", "text": {"content": title, "link": null}, "plain_text": title}],
            "properties": {},
        });
        self.databases.insert(id.to_string(), database.clone());
        database
    }

    /// Store a page and return it as the API would.
    pub fn insert_page(&mut self, parent: Value, mut properties: Value) -> Value {
        tag_properties(&mut properties);
        let page = json!({
            "object": "page",
            "id": Uuid::new_v4().to_string(),
            "archived": false,
            "parent": parent,
            "properties": properties,
        });
        self.pages.push(page.clone());
        page
    }

    pub fn insert_block(&mut self, id: &str, mut block: Value) -> Value {
        if let Some(fields) = block.as_object_mut() {
            fields.insert("object".to_string(), json!("block"));
            fields.insert("id".to_string(), json!(id));
        }
        self.blocks.insert(id.to_string(), block.clone());
        block
    }

    pub fn into_db(self) -> Db {
        Arc::new(RwLock::new(self))
    }

    fn page(&self, id: &str) -> Option<&Value> {
        self.pages.iter().find(|p| p["id"] == id)
    }

    fn page_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.pages.iter_mut().find(|p| p["id"] == id)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), NotionError> {
        let expected = format!("Bearer {}", self.token);
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            return Err(NotionError::new(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "API token is invalid.",
            ));
        }
        if headers.get("notion-version").is_none() {
            return Err(NotionError::new(
                StatusCode::BAD_REQUEST,
                "missing_version",
                "Notion-Version header failed validation.",
            ));
        }
        Ok(())
    }
}

/// An API-level failure rendered as a Notion error object.
#[derive(Debug)]
pub struct NotionError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl NotionError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn not_found(kind: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "object_not_found",
            format!("Could not find {kind} with ID: {id}."),
        )
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }
}

impl IntoResponse for NotionError {
    fn into_response(self) -> Response {
        let body = json!({
            "object": "error",
            "status": self.status.as_u16(),
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, NotionError>;

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/v1/pages", post(create_page))
        .route("/v1/pages/{id}", get(retrieve_page).patch(update_page))
        .route("/v1/databases/{id}", get(retrieve_database))
        .route("/v1/databases/{id}/query", post(query_database))
        .route("/v1/blocks/{id}", get(retrieve_block).patch(update_block))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

/// Parse a request body; an empty body reads as `{}`.
fn parse_body<T: for<'de> Deserialize<'de>>(body: &Bytes) -> Result<T, NotionError> {
    let raw: &[u8] = if body.is_empty() { b"{}" } else { &body[..] };
    serde_json::from_slice(raw).map_err(|e| NotionError::validation(format!("body failed validation: {e}")))
}

/// Add a `type` tag to each property fragment that lacks one, as the real
/// API does in its responses.
fn tag_properties(properties: &mut Value) {
    let Some(map) = properties.as_object_mut() else {
        return;
    };
    for fragment in map.values_mut() {
        if let Some(fields) = fragment.as_object_mut() {
            if fields.contains_key("type") {
                continue;
            }
            if let Some(kind) = PROPERTY_KINDS.iter().find(|k| fields.contains_key(**k)) {
                fields.insert("type".to_string(), json!(kind));
            }
        }
    }
}

#[derive(Deserialize)]
struct CreatePageBody {
    parent: Value,
    #[serde(default)]
    properties: Value,
}

async fn create_page(State(db): State<Db>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let mut ws = db.write().await;
    ws.authorize(&headers)?;
    let input: CreatePageBody = parse_body(&body)?;

    if let Some(database_id) = input.parent.get("database_id").and_then(Value::as_str) {
        if !ws.databases.contains_key(database_id) {
            return Err(NotionError::not_found("database", database_id));
        }
    } else if let Some(page_id) = input.parent.get("page_id").and_then(Value::as_str) {
        if ws.page(page_id).is_none() {
            return Err(NotionError::not_found("page", page_id));
        }
    } else {
        return Err(NotionError::validation(
            "body.parent should define database_id or page_id.",
        ));
    }

    let properties = if input.properties.is_null() {
        json!({})
    } else {
        input.properties
    };
    let page = ws.insert_page(input.parent, properties);
    debug!(page_id = %page["id"], "page created");
    Ok(Json(page))
}

async fn retrieve_page(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let ws = db.read().await;
    ws.authorize(&headers)?;
    ws.page(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| NotionError::not_found("page", &id))
}

#[derive(Deserialize)]
struct UpdatePageBody {
    properties: Option<Map<String, Value>>,
    archived: Option<bool>,
}

async fn update_page(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let mut ws = db.write().await;
    ws.authorize(&headers)?;
    let input: UpdatePageBody = parse_body(&body)?;
    let page = ws
        .page_mut(&id)
        .ok_or_else(|| NotionError::not_found("page", &id))?;

    let archived = input.archived.unwrap_or(page["archived"] == true);
    if archived && input.properties.is_some() {
        return Err(NotionError::validation(
            "Can't edit block that is archived. You must unarchive the block before editing.",
        ));
    }
    page["archived"] = json!(archived);

    if let Some(updates) = input.properties {
        let mut updates = Value::Object(updates);
        tag_properties(&mut updates);
        if let (Some(current), Value::Object(updates)) = (page["properties"].as_object_mut(), updates)
        {
            current.extend(updates);
        }
    }
    Ok(Json(page.clone()))
}

async fn retrieve_database(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let ws = db.read().await;
    ws.authorize(&headers)?;
    ws.databases
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| NotionError::not_found("database", &id))
}

#[derive(Deserialize)]
struct QueryBody {
    start_cursor: Option<String>,
    page_size: Option<usize>,
}

async fn query_database(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let ws = db.read().await;
    ws.authorize(&headers)?;
    let input: QueryBody = parse_body(&body)?;
    if !ws.databases.contains_key(&id) {
        return Err(NotionError::not_found("database", &id));
    }

    let rows: Vec<&Value> = ws
        .pages
        .iter()
        .filter(|p| p["parent"]["database_id"] == id.as_str() && p["archived"] != true)
        .collect();

    let start = match input.start_cursor.as_deref() {
        None => 0,
        Some(cursor) => rows
            .iter()
            .position(|p| p["id"] == cursor)
            .ok_or_else(|| NotionError::validation(format!("start_cursor {cursor} is invalid.")))?,
    };
    let size = input
        .page_size
        .unwrap_or(ws.page_size)
        .clamp(1, MAX_PAGE_SIZE);
    let end = (start + size).min(rows.len());
    let next_cursor = rows.get(end).map(|p| p["id"].clone()).unwrap_or(Value::Null);

    Ok(Json(json!({
        "object": "list",
        "results": rows[start..end],
        "next_cursor": next_cursor,
        "has_more": end < rows.len(),
    })))
}

async fn retrieve_block(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let ws = db.read().await;
    ws.authorize(&headers)?;
    ws.blocks
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| NotionError::not_found("block", &id))
}

async fn update_block(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let mut ws = db.write().await;
    ws.authorize(&headers)?;
    let updates: Map<String, Value> = parse_body(&body)?;
    let block = ws
        .blocks
        .get_mut(&id)
        .ok_or_else(|| NotionError::not_found("block", &id))?;
    if let Some(fields) = block.as_object_mut() {
        for (key, value) in updates {
            if key != "id" && key != "object" {
                fields.insert(key, value);
            }
        }
    }
    Ok(Json(block.clone()))
}
