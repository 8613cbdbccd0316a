// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mirror derivation and reconciliation logic.

pub mod mirror;
pub mod secrets;

pub use mirror::{MirrorSync, ReconcileOutcome, SecretKey};
pub use secrets::{build_mirror, mirror_up_to_date, routing_for, Routing, SkipReason};
