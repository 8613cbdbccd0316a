// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by the distributor
pub mod annotations {
    /// Sink tokens the secret should be distributed to, e.g. "k8s,vault"
    pub const TYPES: &str = "secrets-distributor.z2h.dev/types";
    /// Namespace the mirror secret is placed in
    pub const TARGET_NAMESPACE: &str = "secrets-distributor.z2h.dev/target-namespace";
    /// Provenance string, the only annotation carried over to the mirror
    pub const OWNER: &str = "secrets-distributor.z2h.dev/owner";
}

/// The operator name used as field manager and RBAC object name
pub const OPERATOR_NAME: &str = "secrets-distributor";

/// Sink token that opts a secret into in-cluster mirroring
pub const DEFAULT_SINK_MARKER: &str = "k8s";

/// Defaults for environment configuration
pub mod defaults {
    /// Requeue delay after a failed reconciliation
    pub const ERROR_REQUEUE_SECS: u64 = 60;
    /// Upper bound for a single API request
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
