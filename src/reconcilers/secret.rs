// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - watches Secrets and keeps their mirrors in sync.

use crate::config::Config;
use crate::error::{DistributorError, Result};
use crate::kubernetes::KubeStore;
use crate::sync::{MirrorSync, ReconcileOutcome, SecretKey};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct SecretReconciler {
    client: Client,
    config: Config,
}

/// State shared by every reconciliation run
pub struct Context {
    sync: MirrorSync<KubeStore>,
    error_requeue: Duration,
}

impl Context {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            sync: MirrorSync::new(
                KubeStore::new(client).with_timeout(config.request_timeout),
                config.sink_marker.clone(),
            ),
            error_requeue: config.error_requeue,
        }
    }
}

impl SecretReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = match &self.config.watch_namespace {
            Some(namespace) => {
                info!("Watching secrets in namespace {}", namespace);
                Api::namespaced(self.client.clone(), namespace)
            }
            None => {
                info!("Watching secrets in all namespaces");
                Api::all(self.client.clone())
            }
        };
        let context = Arc::new(Context::new(self.client, &self.config));

        Controller::new(secrets, WatcherConfig::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled secret: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(secret: Arc<Secret>, ctx: Arc<Context>) -> Result<Action> {
    let key = SecretKey::new(secret.namespace().unwrap_or_default(), secret.name_any());

    let outcome = ctx.sync.reconcile(&key).await?;
    debug!("Secret {} reconciled: {:?}", key, outcome);

    Ok(action_for(&outcome))
}

/// Every outcome is terminal until the next watch event for the secret
fn action_for(_outcome: &ReconcileOutcome) -> Action {
    Action::await_change()
}

fn error_policy(secret: Arc<Secret>, error: &DistributorError, ctx: Arc<Context>) -> Action {
    error!(
        "Reconciliation of secret {}/{} failed, retrying in {:?}: {}",
        secret.namespace().unwrap_or_default(),
        secret.name_any(),
        ctx.error_requeue,
        error
    );
    Action::requeue(ctx.error_requeue)
}
