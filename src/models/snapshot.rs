// Published collector state: per-interface counters and the snapshot aggregate

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::InterfaceInfo;

/// Bond `sw_if_index` to ordered member `sw_if_index`es, rebuilt once per
/// sampling pass. Best effort: empty when the membership dump is unavailable.
pub type BondMembership = BTreeMap<u32, Vec<u32>>;

/// Counters read from the stats segment for one interface during one pass.
/// All values are cumulative since interface creation; wraparound is applied
/// at encoding time, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceCounters {
    pub rx_packets: u64,
    pub rx_octets: u64,
    pub rx_errors: u64,
    pub rx_no_buf: u64,
    pub rx_multicast: u64,
    pub rx_broadcast: u64,
    pub tx_packets: u64,
    pub tx_octets: u64,
    pub tx_errors: u64,
    pub tx_multicast: u64,
    pub tx_broadcast: u64,
    pub drops: u64,
    pub punts: u64,
    /// Unix seconds at sampling time.
    pub timestamp: u64,
}

/// One internally consistent sampling result. `interface_stats`,
/// `interface_order` and `bond_members` always come from the same pass;
/// a partially collected pass is never published.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub interfaces: HashMap<String, InterfaceInfo>,
    pub interface_stats: HashMap<String, InterfaceCounters>,
    /// Stats-segment enumeration order at the last successful pass.
    pub interface_order: Vec<String>,
    pub bond_members: BondMembership,
    /// Persistent protocol index per interface name; survives interface
    /// removal so that rows keep their index across set changes.
    pub if_index: HashMap<String, u32>,
    /// Unix seconds of the last successful pass; 0 before the first one.
    pub last_update: u64,
    pub update_count: u64,
    pub error_count: u64,
}

impl Snapshot {
    /// True until the first successful sampling pass has been published.
    pub fn is_empty(&self) -> bool {
        self.update_count == 0
    }
}
