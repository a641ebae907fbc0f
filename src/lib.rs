//! PowLedger - a single-node append-only ledger secured by proof-of-work
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Chain construction, block sealing and chain validation
//! - [`transaction`] - Transaction records
//! - [`mempool`] - Pending transaction pool
//!
//! ## Consensus & Hashing
//! - [`miner`] - Proof-of-work puzzle search and verification
//! - [`crypto`] - Canonical block hashing (SHA-256)
//!
//! ## Networking
//! - [`network`] - Registry of known peers
//!
//! ## Integration
//! - [`api`] - REST API (feature `api`)
//! - [`node`] - Process orchestration
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Hashing
// ============================================================================
pub mod crypto;
pub mod miner;

// ============================================================================
// Networking
// ============================================================================
pub mod network;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
