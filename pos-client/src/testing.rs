//! Scripted backend for unit tests

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::models::{DiningTable, OrderStatus, TableStatus, User};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::actions::MutationApi;
use crate::auth::AuthApi;
use crate::cache::{QueryFetcher, QueryKey};
use crate::error::{ClientError, ClientResult};

#[derive(Default)]
struct Script {
    responses: HashMap<String, VecDeque<ClientResult<Value>>>,
    calls: Vec<String>,
}

/// Answers requests from per-route queues. GETs are keyed by URL, writes by
/// `"POST /path"` / `"PATCH /path"`. An empty queue answers 404.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, route: &str, value: Value) {
        self.push(route, Ok(value));
    }

    pub fn respond_err(&self, route: &str, err: ClientError) {
        self.push(route, Err(err));
    }

    fn push(&self, route: &str, result: ClientResult<Value>) {
        self.inner
            .lock()
            .unwrap()
            .responses
            .entry(route.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn next(&self, route: String) -> ClientResult<Value> {
        let mut script = self.inner.lock().unwrap();
        script.calls.push(route.clone());
        script
            .responses
            .get_mut(&route)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Err(ClientError::NotFound(route)))
    }
}

#[async_trait]
impl QueryFetcher for ScriptedBackend {
    async fn fetch(&self, key: &QueryKey) -> ClientResult<Value> {
        self.next(key.to_string())
    }
}

#[async_trait]
impl MutationApi for ScriptedBackend {
    async fn post_value(&self, path: &str, _body: Value) -> ClientResult<Value> {
        self.next(format!("POST {path}"))
    }

    async fn patch_value(&self, path: &str, _body: Value) -> ClientResult<Value> {
        self.next(format!("PATCH {path}"))
    }
}

#[async_trait]
impl AuthApi for ScriptedBackend {
    async fn login(&self, _username: &str, _password: &str) -> ClientResult<User> {
        Ok(serde_json::from_value(self.next("POST /api/login".into())?)?)
    }

    async fn logout(&self) -> ClientResult<()> {
        self.next("POST /api/logout".into()).map(|_| ())
    }
}

pub fn table(id: i64, status: TableStatus) -> DiningTable {
    DiningTable {
        id,
        tenant_id: 1,
        area_id: 1,
        name: format!("Masa {id}"),
        capacity: 4,
        pos_x: 0,
        pos_y: 0,
        status,
        is_active: true,
    }
}

pub fn order_json(id: i64, status: OrderStatus) -> Value {
    json!({
        "id": id,
        "tenantId": 1,
        "tableId": 5,
        "userId": 1,
        "status": status.as_str(),
        "startTime": 1_700_000_000_000_i64,
        "endTime": null,
        "totalAmount": "0.00",
        "isPaid": false,
        "paymentMethod": null,
        "customerCount": 2
    })
}

pub fn user_json(id: i64, tenant_id: i64) -> Value {
    json!({
        "id": id,
        "tenantId": tenant_id,
        "username": "admin",
        "fullName": "Admin",
        "role": "admin",
        "isActive": true
    })
}
