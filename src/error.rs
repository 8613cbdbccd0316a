// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

/// Every variant is treated as transient: the controller requeues the key.
#[derive(Error, Debug)]
pub enum DistributorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Namespace creation failed: {0}")]
    NamespaceError(String),

    #[error("Mirror write failed: {0}")]
    MirrorError(String),

    #[error("Conflicting write: {0}")]
    Conflict(String),

    #[error("Request timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, DistributorError>;
