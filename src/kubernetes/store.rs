// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource store capability consumed by the mirror reconciler.

use crate::constants::{defaults, OPERATOR_NAME};
use crate::error::{DistributorError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client, ResourceExt,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

/// Result of asking the store to create a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceCreation {
    Created,
    AlreadyExists,
}

/// Typed access to the secrets and namespaces of a cluster.
///
/// The reconciler only ever reads, creates and updates; it never lists,
/// watches or deletes through this interface.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a secret, `None` when it does not exist
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    /// Create a secret in the namespace named by its metadata
    async fn create_secret(&self, secret: &Secret) -> Result<()>;

    /// Replace an existing secret; a stale resource version yields [`DistributorError::Conflict`]
    async fn update_secret(&self, secret: &Secret) -> Result<()>;

    /// Create a namespace, reporting whether it was already there
    async fn create_namespace(&self, name: &str) -> Result<NamespaceCreation>;
}

/// [`ResourceStore`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    timeout: Duration,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        }
    }

    /// Bound every request by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T>(
        &self,
        what: String,
        request: impl Future<Output = kube::Result<T>> + Send,
    ) -> Result<kube::Result<T>> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| DistributorError::Timeout(format!("{} after {:?}", what, self.timeout)))
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        }
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn secret_ref(secret: &Secret) -> String {
    format!(
        "{}/{}",
        secret.namespace().unwrap_or_default(),
        secret.name_any()
    )
}

#[async_trait]
impl ResourceStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let secrets = self.secrets(namespace);
        let request = secrets.get(name);
        match self
            .bounded(format!("get secret {}/{}", namespace, name), request)
            .await?
        {
            Ok(secret) => Ok(Some(secret)),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("Secret {}/{} not found", namespace, name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, secret), fields(secret = %secret_ref(secret)))]
    async fn create_secret(&self, secret: &Secret) -> Result<()> {
        let secrets = self.secrets(&secret.namespace().unwrap_or_default());
        let params = Self::post_params();
        let request = secrets.create(&params, secret);
        self.bounded(format!("create secret {}", secret_ref(secret)), request)
            .await?
            .map_err(|e| {
                DistributorError::MirrorError(format!(
                    "Failed to create secret {}: {}",
                    secret_ref(secret),
                    e
                ))
            })?;
        Ok(())
    }

    #[instrument(skip(self, secret), fields(secret = %secret_ref(secret)))]
    async fn update_secret(&self, secret: &Secret) -> Result<()> {
        let secrets = self.secrets(&secret.namespace().unwrap_or_default());
        let name = secret.name_any();
        let params = Self::post_params();
        let request = secrets.replace(&name, &params, secret);
        match self
            .bounded(format!("update secret {}", secret_ref(secret)), request)
            .await?
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(err)) if err.code == 409 => Err(DistributorError::Conflict(
                format!("Secret {} was modified concurrently: {}", secret_ref(secret), err.message),
            )),
            Err(e) => Err(DistributorError::MirrorError(format!(
                "Failed to update secret {}: {}",
                secret_ref(secret),
                e
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn create_namespace(&self, name: &str) -> Result<NamespaceCreation> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let params = Self::post_params();
        let request = namespaces.create(&params, &ns);
        match self
            .bounded(format!("create namespace {}", name), request)
            .await?
        {
            Ok(_) => Ok(NamespaceCreation::Created),
            Err(kube::Error::Api(err)) if err.code == 409 => Ok(NamespaceCreation::AlreadyExists),
            Err(e) => Err(DistributorError::NamespaceError(format!(
                "Failed to create namespace {}: {}",
                name, e
            ))),
        }
    }
}
