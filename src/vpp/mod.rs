// Boundary to the VPP collaborators: control API and shared stats segment.
// The real bindings live outside this crate; everything here is trait-shaped
// so the collector can run against any implementation (see sim).

pub mod accessor;
pub mod sim;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BondMembership, InterfaceInfo};

/// Interface name vector; index order defines the stats row index.
pub const IF_NAMES: &str = "/if/names";
pub const IF_RX: &str = "/if/rx";
pub const IF_TX: &str = "/if/tx";
pub const IF_RX_ERROR: &str = "/if/rx-error";
pub const IF_TX_ERROR: &str = "/if/tx-error";
pub const IF_DROPS: &str = "/if/drops";
pub const IF_RX_NO_BUF: &str = "/if/rx-no-buf";
pub const IF_RX_MULTICAST: &str = "/if/rx-multicast";
pub const IF_RX_BROADCAST: &str = "/if/rx-broadcast";
pub const IF_TX_MULTICAST: &str = "/if/tx-multicast";
pub const IF_TX_BROADCAST: &str = "/if/tx-broadcast";
pub const IF_PUNTS: &str = "/if/punts";

/// Paths every supported VPP version exposes. Their absence means the stats
/// segment is incompatible, which is a fatal startup condition.
pub const REQUIRED_PATHS: [&str; 3] = [IF_NAMES, IF_RX, IF_TX];

/// Paths that come and go between VPP versions; read through `StatAccessor`
/// only, with a per-call default.
pub const OPTIONAL_PATHS: [&str; 9] = [
    IF_RX_ERROR,
    IF_TX_ERROR,
    IF_DROPS,
    IF_RX_NO_BUF,
    IF_RX_MULTICAST,
    IF_RX_BROADCAST,
    IF_TX_MULTICAST,
    IF_TX_BROADCAST,
    IF_PUNTS,
];

/// How a per-worker counter vector collapses to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Plain sum of simple counters.
    Sum,
    /// Packet halves of combined packet/octet counters.
    SumPackets,
    /// Octet halves of combined packet/octet counters.
    SumOctets,
}

#[derive(Debug, Error)]
pub enum VppError {
    #[error("not connected")]
    NotConnected,
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("upstream call timed out after {0}s")]
    Timeout(u64),
    #[error("read failed for {path}[{index}]: {reason}")]
    Read {
        path: String,
        index: usize,
        reason: String,
    },
    #[error("missing required stats paths: {0:?}")]
    MissingRequired(Vec<String>),
    #[error("api call failed: {0}")]
    Api(String),
}

/// Control-plane metadata source (interface table, bond membership).
#[async_trait]
pub trait ControlApi: Send {
    async fn connect(&mut self) -> Result<(), VppError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    /// Interface table keyed by name.
    async fn interfaces(&mut self) -> Result<HashMap<String, InterfaceInfo>, VppError>;

    /// Bond membership dump. Callers treat failure as an empty map.
    async fn bond_membership(&mut self) -> Result<BondMembership, VppError>;
}

/// Shared statistics segment: a directory of counter paths plus indexed
/// aggregate reads.
#[async_trait]
pub trait StatsSegment: Send {
    async fn connect(&mut self) -> Result<(), VppError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    /// The set of counter paths the connected segment currently exposes.
    async fn directory(&mut self) -> Result<HashSet<String>, VppError>;

    /// Contents of `/if/names`; row index in other paths follows this order.
    async fn interface_names(&mut self) -> Result<Vec<String>, VppError>;

    /// Aggregate value of `path` for the interface at `index`.
    async fn read(&mut self, path: &str, index: usize, agg: Aggregation) -> Result<u64, VppError>;
}

/// Startup precondition: all required paths present. Logs which optional
/// paths the segment lacks so missing counters are explainable from the log.
pub fn validate_directory(directory: &HashSet<String>) -> Result<(), VppError> {
    let missing: Vec<String> = REQUIRED_PATHS
        .iter()
        .filter(|p| !directory.contains(**p))
        .map(|p| p.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(VppError::MissingRequired(missing));
    }

    let unavailable: Vec<&str> = OPTIONAL_PATHS
        .iter()
        .copied()
        .filter(|p| !directory.contains(*p))
        .collect();
    if unavailable.is_empty() {
        tracing::debug!("all optional stats paths available");
    } else {
        tracing::warn!(
            paths = ?unavailable,
            "optional stats paths unavailable in this VPP version; reporting 0 for them"
        );
    }
    Ok(())
}
