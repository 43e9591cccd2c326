//! # Storage Module
//!
//! Durable vault snapshots for hosts that keep state between calls (the
//! CLI, a wallet backend). The engine itself is storage-agnostic: it takes
//! a snapshot and returns a new one. This module only decides where the
//! bytes live and serializes concurrent writers.
//!
//! Bincode on disk, JSON at the edges.

pub mod db;

pub use db::{StoreError, StoreResult, VaultStore};
