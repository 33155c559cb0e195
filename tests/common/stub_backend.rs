//! Stateful stub of the ledger backend.
//!
//! Speaks the `{errcode, ret}` envelope under `/api`, keeps cards,
//! categories and records in memory and guards everything except login
//! behind a `session=ok` cookie.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Method, Request, Response, StatusCode, Uri};
use axum::routing::any;
use axum::Router;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const PASSWORD: &str = "secret";

/// A captured request for assertions. `path` has the `/api` prefix removed.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Value,
}

/// Backend data, reachable from tests through [`StubBackend::with_db`].
#[derive(Debug, Default)]
pub struct Db {
    pub cards: Vec<Value>,
    pub swipe_types: Vec<Value>,
    pub consumption_types: Vec<Value>,
    pub records: Vec<Value>,
    pub fail_logout: bool,
    next_id: u64,
}

impl Db {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Insert a payment record dated `2025-01-{day}`.
    pub fn seed_record(&mut self, card_id: &str, day: u32, amount: f64) -> String {
        let id = self.next_id("rec");
        self.records.push(json!({
            "id": id,
            "card_id": card_id,
            "amount": amount,
            "record_type": "支付",
            "status": "未还",
            "trade_date": format!("2025-01-{:02}T12:00:00", day),
            "description": format!("purchase {}", day),
        }));
        id
    }

    pub fn seed_consumption_type(&mut self, name: &str) -> String {
        let id = self.next_id("ctype");
        self.consumption_types
            .push(json!({"id": id, "name": name, "color": "#409eff", "sort_order": 0}));
        id
    }
}

#[derive(Clone)]
struct StubState {
    db: Arc<Mutex<Db>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct StubBackend {
    pub addr: SocketAddr,
    state: StubState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = StubState {
            db: Arc::new(Mutex::new(Db::default())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/api/{*path}", any(handle_request))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn with_db<R>(&self, f: impl FnOnce(&mut Db) -> R) -> R {
        f(&mut *self.state.db.lock().await)
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Requests that reached `path` (without the `/api` prefix).
    pub async fn hits(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .await
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn handle_request(State(state): State<StubState>, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let uri: Uri = req.uri().clone();
    let path = uri.path().trim_start_matches("/api").to_string();
    let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let has_session = req
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == "session=ok"));

    let bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    let captured = CapturedRequest {
        method,
        path,
        query,
        body,
    };
    state.requests.lock().await.push(captured.clone());

    let mut db = state.db.lock().await;
    respond(route(&mut db, &captured, has_session))
}

struct Reply {
    status: StatusCode,
    cookie: Option<&'static str>,
    body: Value,
}

fn ok(ret: Value) -> Reply {
    Reply {
        status: StatusCode::OK,
        cookie: None,
        body: json!({"errcode": 0, "ret": ret}),
    }
}

fn fail(code: i64, message: &str) -> Reply {
    Reply {
        status: StatusCode::OK,
        cookie: None,
        body: json!({"errcode": code, "errmsg": message}),
    }
}

fn respond(reply: Reply) -> Response<Body> {
    let mut builder = Response::builder()
        .status(reply.status)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = reply.cookie {
        builder = builder.header(header::SET_COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(&reply.body).unwrap()))
        .unwrap()
}

fn route(db: &mut Db, req: &CapturedRequest, has_session: bool) -> Reply {
    let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();

    if segments == ["user", "login"] {
        return login(&req.body);
    }
    if !has_session {
        return Reply {
            status: StatusCode::UNAUTHORIZED,
            cookie: None,
            body: json!({"detail": "Not logged in"}),
        };
    }

    match (req.method.as_str(), segments.as_slice()) {
        ("POST", ["user", "logout"]) => {
            if db.fail_logout {
                return Reply {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    cookie: None,
                    body: json!({"detail": "logout unavailable"}),
                };
            }
            Reply {
                cookie: Some("session=; Path=/; Max-Age=0"),
                ..ok(json!({}))
            }
        }
        ("POST", ["user", "get"]) => ok(user()),

        ("GET", ["card", "list"]) => {
            let active = req.query.get("is_active").map(|v| v == "true");
            let cards: Vec<Value> = db
                .cards
                .iter()
                .filter(|c| active.map_or(true, |a| c["is_active"] == a))
                .cloned()
                .collect();
            ok(Value::Array(cards))
        }
        ("POST", ["card", "add"]) => {
            let id = db.next_id("card");
            let mut card = object(&req.body);
            card.insert("id".into(), json!(id));
            card.entry("is_active").or_insert(json!(true));
            db.cards.push(Value::Object(card));
            ok(json!({"id": id}))
        }
        ("PUT", ["card", "update", id]) => update(&mut db.cards, id, &req.body),
        ("DELETE", ["card", "delete", id]) => remove(&mut db.cards, id),
        ("GET", ["card", "detail", id]) => match db.cards.iter().find(|c| c["id"] == *id) {
            Some(card) => ok(card.clone()),
            None => fail(404, "Card not found"),
        },

        ("GET", ["category", "swipe-types"]) => ok(Value::Array(db.swipe_types.clone())),
        ("GET", ["category", "consumption-types"]) => {
            ok(Value::Array(db.consumption_types.clone()))
        }
        ("POST", ["category", "swipe-type"]) => {
            let id = db.next_id("stype");
            insert(&mut db.swipe_types, id, &req.body)
        }
        ("POST", ["category", "consumption-type"]) => {
            let id = db.next_id("ctype");
            insert(&mut db.consumption_types, id, &req.body)
        }
        ("PUT", ["category", "swipe-type", id]) => update(&mut db.swipe_types, id, &req.body),
        ("PUT", ["category", "consumption-type", id]) => {
            update(&mut db.consumption_types, id, &req.body)
        }
        ("DELETE", ["category", "swipe-type", id]) => remove(&mut db.swipe_types, id),
        ("DELETE", ["category", "consumption-type", id]) => {
            remove(&mut db.consumption_types, id)
        }

        ("GET", ["record", "list"]) => record_list(db, &req.query),
        ("POST", ["record", "add"]) => {
            let id = db.next_id("rec");
            let mut record = object(&req.body);
            record.insert("id".into(), json!(id));
            record
                .entry("trade_date")
                .or_insert(json!("2025-01-31T12:00:00"));
            db.records.push(Value::Object(record));
            ok(json!({"id": id}))
        }
        ("PUT", ["record", "update", id]) => update(&mut db.records, id, &req.body),
        ("DELETE", ["record", "delete", id]) => remove(&mut db.records, id),
        ("GET", ["record", "stats"]) => record_stats(db, &req.query),
        ("GET", ["record", "recent-consumptions"]) => {
            let mut recent = filtered_records(db, &HashMap::new());
            recent.truncate(5);
            ok(json!({"records": recent}))
        }

        ("GET", ["home", "dashboard"]) => {
            let total_limit: f64 = db
                .cards
                .iter()
                .filter_map(|c| c["credit_limit"].as_f64())
                .sum();
            ok(json!({
                "card_count": db.cards.len(),
                "record_count": db.records.len(),
                "total_credit_limit": total_limit,
            }))
        }

        _ => Reply {
            status: StatusCode::NOT_FOUND,
            cookie: None,
            body: json!({"detail": format!("No route for {}", req.path)}),
        },
    }
}

fn user() -> Value {
    json!({"id": "user-1", "name": "Test User", "mobile": "13800000000"})
}

fn login(body: &Value) -> Reply {
    if body["password"] != PASSWORD {
        return fail(1001, "Wrong mobile or password");
    }
    Reply {
        cookie: Some("session=ok; Path=/"),
        ..ok(user())
    }
}

fn object(body: &Value) -> Map<String, Value> {
    body.as_object().cloned().unwrap_or_default()
}

fn insert(items: &mut Vec<Value>, id: String, body: &Value) -> Reply {
    let mut item = object(body);
    item.insert("id".into(), json!(id));
    items.push(Value::Object(item));
    ok(json!({"id": id}))
}

fn update(items: &mut [Value], id: &str, body: &Value) -> Reply {
    let Some(item) = items.iter_mut().find(|i| i["id"] == id) else {
        return fail(404, "Not found");
    };
    if let (Some(target), Some(changes)) = (item.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    ok(json!({}))
}

fn remove(items: &mut Vec<Value>, id: &str) -> Reply {
    let before = items.len();
    items.retain(|i| i["id"] != id);
    if items.len() == before {
        return fail(404, "Not found");
    }
    ok(json!({}))
}

/// Newest first, with the list filters applied.
fn filtered_records(db: &Db, query: &HashMap<String, String>) -> Vec<Value> {
    let mut records: Vec<Value> = db
        .records
        .iter()
        .filter(|r| {
            let date = r["trade_date"].as_str().unwrap_or("");
            let day = date.get(..10).unwrap_or(date);
            query.get("card_id").map_or(true, |v| r["card_id"] == v.as_str())
                && query
                    .get("consumption_type_id")
                    .map_or(true, |v| r["consumption_type_id"] == v.as_str())
                && query.get("start_date").map_or(true, |v| day >= v.as_str())
                && query.get("end_date").map_or(true, |v| day <= v.as_str())
        })
        .cloned()
        .collect();
    records.sort_by(|a, b| {
        b["trade_date"]
            .as_str()
            .unwrap_or("")
            .cmp(a["trade_date"].as_str().unwrap_or(""))
    });
    records
}

fn record_list(db: &Db, query: &HashMap<String, String>) -> Reply {
    let page: usize = query.get("page").and_then(|v| v.parse::<usize>().ok()).unwrap_or(1).max(1);
    let page_size: usize = query
        .get("page_size")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(20)
        .max(1);

    let records = filtered_records(db, query);
    let total = records.len();
    let list: Vec<Value> = records
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    ok(json!({
        "list": list,
        "total": total,
        "page": page,
        "page_size": page_size,
        "total_pages": total.div_ceil(page_size),
    }))
}

fn record_stats(db: &Db, query: &HashMap<String, String>) -> Reply {
    let mut groups: Vec<(String, f64, u64)> = Vec::new();
    let mut total = 0.0;
    for record in filtered_records(db, query) {
        if record["record_type"] != "支付" {
            continue;
        }
        let amount = record["amount"].as_f64().unwrap_or(0.0);
        let type_id = record["consumption_type_id"].as_str().unwrap_or("").to_string();
        total += amount;
        match groups.iter_mut().find(|(id, _, _)| *id == type_id) {
            Some(group) => {
                group.1 += amount;
                group.2 += 1;
            }
            None => groups.push((type_id, amount, 1)),
        }
    }

    let stats: Vec<Value> = groups
        .into_iter()
        .map(|(id, amount, count)| {
            let name = db
                .consumption_types
                .iter()
                .find(|t| t["id"] == id.as_str())
                .and_then(|t| t["name"].as_str())
                .unwrap_or("Uncategorized");
            json!({
                "consumption_type_id": id,
                "consumption_type_name": name,
                "total_amount": amount,
                "count": count,
            })
        })
        .collect();

    ok(json!({"stats": stats, "total_amount": total}))
}
