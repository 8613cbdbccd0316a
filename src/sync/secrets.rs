// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Routing annotations, mirror derivation and drift detection

use crate::constants::annotations;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ObjectMeta, ResourceExt};
use std::collections::BTreeMap;
use std::fmt;

/// Where a source secret should be mirrored to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    pub target_namespace: String,
}

/// Why a secret is not a candidate for mirroring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `types` or `target-namespace` is absent or empty
    MissingAnnotations,
    /// `types` does not contain the sink marker
    SinkNotTargeted { types: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingAnnotations => write!(f, "missing required annotations"),
            SkipReason::SinkNotTargeted { types } => {
                write!(f, "sink marker not in target types '{}'", types)
            }
        }
    }
}

fn annotation<'a>(secret: &'a Secret, key: &str) -> Option<&'a str> {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(|s| s.as_str())
}

/// Check whether `types` mentions `marker` anywhere, regardless of separators
pub fn has_sink_marker(types: &str, marker: &str) -> bool {
    types.contains(marker)
}

/// Read the routing annotations of a source secret
pub fn routing_for(secret: &Secret, sink_marker: &str) -> Result<Routing, SkipReason> {
    let types = annotation(secret, annotations::TYPES).unwrap_or_default();
    let target_namespace = annotation(secret, annotations::TARGET_NAMESPACE).unwrap_or_default();

    if types.is_empty() || target_namespace.is_empty() {
        return Err(SkipReason::MissingAnnotations);
    }

    if !has_sink_marker(types, sink_marker) {
        return Err(SkipReason::SinkNotTargeted {
            types: types.to_string(),
        });
    }

    Ok(Routing {
        target_namespace: target_namespace.to_string(),
    })
}

/// Build the mirror of `source` in `target_namespace`.
///
/// Labels, type and data are copied verbatim. The owner annotation is the only
/// annotation carried over and is empty when the source has none.
pub fn build_mirror(source: &Secret, target_namespace: &str) -> Secret {
    let owner = annotation(source, annotations::OWNER).unwrap_or_default();

    Secret {
        metadata: ObjectMeta {
            name: Some(source.name_any()),
            namespace: Some(target_namespace.to_string()),
            labels: source.metadata.labels.clone(),
            annotations: Some(BTreeMap::from([(
                annotations::OWNER.to_string(),
                owner.to_string(),
            )])),
            ..Default::default()
        },
        data: source.data.clone(),
        type_: source.type_.clone(),
        ..Default::default()
    }
}

/// Key-by-key equality of two optional maps; an absent map equals an empty one.
pub fn maps_equal<V: PartialEq>(
    left: Option<&BTreeMap<String, V>>,
    right: Option<&BTreeMap<String, V>>,
) -> bool {
    let left_len = left.map_or(0, |m| m.len());
    let right_len = right.map_or(0, |m| m.len());
    if left_len != right_len {
        return false;
    }

    let (Some(left), Some(right)) = (left, right) else {
        // both sides empty
        return true;
    };

    left.iter()
        .all(|(key, value)| right.get(key).is_some_and(|other| other == value))
}

/// Whether an existing mirror already carries the desired data and labels
pub fn mirror_up_to_date(existing: &Secret, desired: &Secret) -> bool {
    maps_equal(existing.data.as_ref(), desired.data.as_ref())
        && maps_equal(
            existing.metadata.labels.as_ref(),
            desired.metadata.labels.as_ref(),
        )
}
