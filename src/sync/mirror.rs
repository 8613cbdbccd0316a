// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Single-pass reconciliation of a source secret into its mirror.

use crate::error::Result;
use crate::kubernetes::{ensure_namespace_exists, ResourceStore};
use crate::sync::secrets::{build_mirror, mirror_up_to_date, routing_for, SkipReason};
use std::fmt;
use tracing::{debug, error, info, instrument};

/// Identity of a source secret
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    pub namespace: String,
    pub name: String,
}

impl SecretKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// What a successful reconciliation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The source no longer exists; the mirror is left in place
    SourceDeleted,
    /// The source is not a mirroring candidate
    Skipped(SkipReason),
    /// No mirror existed; one was created
    Created,
    /// The mirror drifted and was overwritten
    Updated,
    /// The mirror already matched; nothing was written
    UpToDate,
}

/// Keeps mirrors in line with their source secrets.
///
/// Holds no state between calls: every pass re-reads source and mirror from the store.
pub struct MirrorSync<S> {
    store: S,
    sink_marker: String,
}

impl<S: ResourceStore> MirrorSync<S> {
    pub fn new(store: S, sink_marker: impl Into<String>) -> Self {
        Self {
            store,
            sink_marker: sink_marker.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self), fields(secret = %key))]
    pub async fn reconcile(&self, key: &SecretKey) -> Result<ReconcileOutcome> {
        let Some(source) = self.store.get_secret(&key.namespace, &key.name).await? else {
            info!("Secret {} was deleted, leaving any mirror in place", key);
            return Ok(ReconcileOutcome::SourceDeleted);
        };

        let routing = match routing_for(&source, &self.sink_marker) {
            Ok(routing) => routing,
            Err(reason) => {
                info!("Skipping secret {}: {}", key, reason);
                return Ok(ReconcileOutcome::Skipped(reason));
            }
        };
        let target_namespace = routing.target_namespace.as_str();

        if let Err(e) = ensure_namespace_exists(&self.store, target_namespace).await {
            error!("Failed to ensure namespace {}: {}", target_namespace, e);
            return Err(e);
        }

        let mut desired = build_mirror(&source, target_namespace);

        let existing = match self.store.get_secret(target_namespace, &key.name).await {
            Ok(existing) => existing,
            Err(e) => {
                error!("Failed to get mirror {}/{}: {}", target_namespace, key.name, e);
                return Err(e);
            }
        };

        let Some(existing) = existing else {
            if let Err(e) = self.store.create_secret(&desired).await {
                error!("Failed to create mirror {}/{}: {}", target_namespace, key.name, e);
                return Err(e);
            }
            info!("Created mirror {}/{}", target_namespace, key.name);
            return Ok(ReconcileOutcome::Created);
        };

        if mirror_up_to_date(&existing, &desired) {
            debug!("Mirror {}/{} is up to date", target_namespace, key.name);
            return Ok(ReconcileOutcome::UpToDate);
        }

        // Labels and annotations are replaced wholesale; only the resource version is kept
        desired.metadata.resource_version = existing.metadata.resource_version.clone();

        if let Err(e) = self.store.update_secret(&desired).await {
            error!("Failed to update mirror {}/{}: {}", target_namespace, key.name, e);
            return Err(e);
        }

        info!("Updated mirror {}/{}", target_namespace, key.name);
        Ok(ReconcileOutcome::Updated)
    }
}
