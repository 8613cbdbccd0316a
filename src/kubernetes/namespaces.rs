// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::Result;
use crate::kubernetes::store::{NamespaceCreation, ResourceStore};
use tracing::{debug, info, instrument};

/// Ensure a namespace exists, creating it if it doesn't.
///
/// Creation is attempted unconditionally; an already existing namespace counts
/// as success, so this is safe to call on every reconciliation.
#[instrument(skip(store))]
pub async fn ensure_namespace_exists<S>(store: &S, namespace: &str) -> Result<()>
where
    S: ResourceStore + ?Sized,
{
    match store.create_namespace(namespace).await? {
        NamespaceCreation::Created => info!("Namespace {} created", namespace),
        NamespaceCreation::AlreadyExists => debug!("Namespace {} already exists", namespace),
    }
    Ok(())
}
