// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API for `KubeStore` and an in-memory store for the reconciler.

use crate::error::{DistributorError, Result};
use crate::kubernetes::{NamespaceCreation, ResourceStore};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A mock HTTP service that returns predefined responses based on method and exact path.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    delay: Option<Duration>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            delay: None,
        }
    }

    /// Hold every response back for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let key = (req.method().to_string(), req.uri().path().to_string());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| (404, not_found_json("resource", &key.1)));

        let delay = self.delay;

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

pub fn secret_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1"
        },
        "type": "Opaque",
        "data": {
            "password": "cEBzcw=="
        }
    })
    .to_string()
}

fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!("{} \"{}\" already exists", resource, name),
    )
}

pub fn conflict_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "Conflict",
        &format!(
            "Operation cannot be fulfilled on {} \"{}\": the object has been modified",
            resource, name
        ),
    )
}

pub fn server_error_json(message: &str) -> String {
    status_json(500, "InternalError", message)
}

/// Store operations that can be counted or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreOp {
    GetSecret,
    CreateSecret,
    UpdateSecret,
    CreateNamespace,
}

/// Fail `op` once `skip` earlier calls of it have gone through
#[derive(Clone, Copy)]
struct Failure {
    op: StoreOp,
    skip: usize,
}

#[derive(Default)]
struct FakeState {
    secrets: BTreeMap<(String, String), Secret>,
    namespaces: BTreeSet<String>,
    calls: BTreeMap<StoreOp, usize>,
    failing: Option<Failure>,
    bump_before_update: Option<(String, String)>,
    next_version: u64,
}

impl FakeState {
    fn store(&mut self, mut secret: Secret) {
        self.next_version += 1;
        secret.metadata.resource_version = Some(self.next_version.to_string());
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.secrets.insert(key, secret);
    }

    fn record(&mut self, op: StoreOp) -> Result<()> {
        *self.calls.entry(op).or_default() += 1;
        match self.failing.as_mut() {
            Some(failure) if failure.op == op => {
                if failure.skip > 0 {
                    failure.skip -= 1;
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
        Err(match op {
            StoreOp::CreateNamespace => {
                DistributorError::NamespaceError("injected failure".to_string())
            }
            _ => DistributorError::MirrorError(format!("injected {:?} failure", op)),
        })
    }
}

/// In-memory [`ResourceStore`] with resource versions and failure injection
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        self.put_secret(secret);
        self
    }

    pub fn with_namespace(self, name: &str) -> Self {
        self.state.lock().unwrap().namespaces.insert(name.to_string());
        self
    }

    /// Write a secret as an outside actor would, without counting it as a store call
    pub fn put_secret(&self, secret: Secret) {
        self.state.lock().unwrap().store(secret);
    }

    pub fn remove_secret(&self, namespace: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .secrets
            .remove(&(namespace.to_string(), name.to_string()));
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state.lock().unwrap().namespaces.contains(name)
    }

    /// Fail every call of `op` until cleared
    pub fn fail_on(&self, op: StoreOp) {
        self.fail_on_nth(op, 1);
    }

    /// Let the first `n - 1` calls of `op` succeed, then fail every later one until cleared
    pub fn fail_on_nth(&self, op: StoreOp, n: usize) {
        self.state.lock().unwrap().failing = Some(Failure {
            op,
            skip: n.saturating_sub(1),
        });
    }

    pub fn clear_failure(&self) {
        self.state.lock().unwrap().failing = None;
    }

    /// Make the next update of this secret lose an optimistic-concurrency race
    pub fn bump_before_update(&self, namespace: &str, name: &str) {
        self.state.lock().unwrap().bump_before_update =
            Some((namespace.to_string(), name.to_string()));
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(&op)
            .copied()
            .unwrap_or_default()
    }

    /// Secret create and update calls
    pub fn secret_writes(&self) -> usize {
        self.count(StoreOp::CreateSecret) + self.count(StoreOp::UpdateSecret)
    }

    /// Every mutating call, namespace creation included
    pub fn total_writes(&self) -> usize {
        self.secret_writes() + self.count(StoreOp::CreateNamespace)
    }
}

#[async_trait]
impl ResourceStore for FakeStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let mut state = self.state.lock().unwrap();
        state.record(StoreOp::GetSecret)?;
        Ok(state
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_secret(&self, secret: &Secret) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(StoreOp::CreateSecret)?;
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        if state.secrets.contains_key(&key) {
            return Err(DistributorError::MirrorError(format!(
                "secret {}/{} already exists",
                key.0, key.1
            )));
        }
        state.store(secret.clone());
        Ok(())
    }

    async fn update_secret(&self, secret: &Secret) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(StoreOp::UpdateSecret)?;
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());

        if state.bump_before_update.as_ref() == Some(&key) {
            state.bump_before_update = None;
            if let Some(current) = state.secrets.get(&key).cloned() {
                state.store(current);
            }
        }

        let Some(current) = state.secrets.get(&key) else {
            return Err(DistributorError::MirrorError(format!(
                "secret {}/{} not found",
                key.0, key.1
            )));
        };

        if secret.metadata.resource_version.is_some()
            && secret.metadata.resource_version != current.metadata.resource_version
        {
            return Err(DistributorError::Conflict(format!(
                "secret {}/{} has been modified",
                key.0, key.1
            )));
        }

        state.store(secret.clone());
        Ok(())
    }

    async fn create_namespace(&self, name: &str) -> Result<NamespaceCreation> {
        let mut state = self.state.lock().unwrap();
        state.record(StoreOp::CreateNamespace)?;
        if state.namespaces.insert(name.to_string()) {
            Ok(NamespaceCreation::Created)
        } else {
            Ok(NamespaceCreation::AlreadyExists)
        }
    }
}
