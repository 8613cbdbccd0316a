// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! RBAC manifest for the permissions the controller needs.

use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule};
use kube::api::ObjectMeta;

fn core_rule(resource: &str, verbs: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![String::new()]),
        resources: Some(vec![resource.to_string()]),
        verbs: verbs.iter().map(|v| v.to_string()).collect(),
        ..Default::default()
    }
}

/// ClusterRole granting secret read/write and namespace creation
pub fn cluster_role(name: &str) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        rules: Some(vec![
            core_rule("secrets", &["get", "list", "watch", "create", "update"]),
            core_rule("namespaces", &["create"]),
        ]),
        ..Default::default()
    }
}

/// Render the ClusterRole as a YAML document
pub fn cluster_role_yaml(name: &str) -> serde_yaml::Result<String> {
    serde_yaml::to_string(&cluster_role(name))
}
