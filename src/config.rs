// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, DEFAULT_SINK_MARKER};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Token that must appear in the types annotation for a secret to be mirrored
    pub sink_marker: String,
    /// Only watch secrets in this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Delay before a failed reconciliation is retried
    pub error_requeue: Duration,
    /// Timeout applied to every request against the API server
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sink_marker: DEFAULT_SINK_MARKER.to_string(),
            watch_namespace: None,
            error_requeue: Duration::from_secs(defaults::ERROR_REQUEUE_SECS),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sink_marker = non_empty("SINK_MARKER")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SINK_MARKER.to_string());

        let watch_namespace = non_empty("WATCH_NAMESPACE");

        let error_requeue_secs = match non_empty("ERROR_REQUEUE_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("ERROR_REQUEUE_SECS is not a valid number: {}", v))?,
            None => defaults::ERROR_REQUEUE_SECS,
        };

        let request_timeout_secs = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a valid number: {}", v))?,
            None => defaults::REQUEST_TIMEOUT_SECS,
        };

        Ok(Config {
            sink_marker,
            watch_namespace,
            error_requeue: Duration::from_secs(error_requeue_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}
