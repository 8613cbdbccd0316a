// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for store access, namespace management and RBAC.

pub mod namespaces;
pub mod rbac;
pub mod store;

pub use namespaces::ensure_namespace_exists;
pub use store::{KubeStore, NamespaceCreation, ResourceStore};
