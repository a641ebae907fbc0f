//! Registry of known peers
//!
//! Peers are stored as their network location, always `host:port`. The
//! registry is bookkeeping only; no connection is ever opened.

use std::collections::HashSet;

use url::Url;

use crate::error::ChainError;

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: HashSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the network location of `address` (e.g. `http://192.168.0.2:5000`).
    ///
    /// Returns `true` when the peer was not known before. Any path, query or
    /// fragment is ignored, so re-registering the same host and port is a no-op.
    pub fn register_node(&mut self, address: &str) -> Result<bool, ChainError> {
        let netloc = parse_netloc(address)?;
        let inserted = self.nodes.insert(netloc.clone());
        if inserted {
            tracing::info!(peer = %netloc, "registered peer");
        }
        Ok(inserted)
    }

    /// Registered peers in sorted order.
    pub fn nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.nodes.iter().cloned().collect();
        nodes.sort();
        nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Extract `host:port` from a URL-like address. An omitted port is filled in
/// from the scheme default.
pub fn parse_netloc(address: &str) -> Result<String, ChainError> {
    let address = address.trim();
    let url = Url::parse(address)
        .map_err(|e| ChainError::InvalidPeerAddress(format!("{}: {}", address, e)))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ChainError::InvalidPeerAddress(format!("{}: missing host", address)))?;

    let port = url.port_or_known_default().ok_or_else(|| {
        ChainError::InvalidPeerAddress(format!("{}: missing port", address))
    })?;

    Ok(format!("{}:{}", host, port))
}
