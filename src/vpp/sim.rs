// Deterministic in-memory dataplane implementing both collaborator traits.
// Backs the integration tests and the standalone binary; counters advance by
// fixed per-interface rates on every sampling pass.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{
    Aggregation, ControlApi, IF_RX, IF_TX, OPTIONAL_PATHS, REQUIRED_PATHS, StatsSegment, VppError,
};
use crate::models::{BondMembership, InterfaceInfo};

/// Per-pass increment applied to every optional counter path.
const MISC_RATE: u64 = 3;

#[derive(Debug, Clone)]
pub struct SimInterface {
    pub info: InterfaceInfo,
    /// (packets, octets) added to the rx counters on every pass.
    pub rx_rate: (u64, u64),
    /// (packets, octets) added to the tx counters on every pass.
    pub tx_rate: (u64, u64),
}

impl SimInterface {
    pub fn new(info: InterfaceInfo) -> Self {
        Self {
            info,
            rx_rate: (100, 64_000),
            tx_rate: (80, 51_200),
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    interfaces: Vec<SimInterface>,
    bond_members: BondMembership,
    directory: HashSet<String>,
    /// Advanced once per pass, when `/if/names` is enumerated.
    ticks: u64,
    api_connected: bool,
    stats_connected: bool,
    api_connects: u32,
    api_disconnects: u32,
    stats_connects: u32,
    stats_disconnects: u32,
    fail_api_connects: u32,
    fail_stats_connects: u32,
    fail_interfaces_calls: u32,
    fail_reads: u32,
}

/// Factory and scripting handle. Clients share state with it, so failures
/// can be injected and connection churn observed while a collector runs.
#[derive(Clone, Default)]
pub struct SimBackend {
    state: Arc<Mutex<SimState>>,
}

impl SimBackend {
    pub fn new(interfaces: Vec<SimInterface>, bond_members: BondMembership) -> Self {
        let directory: HashSet<String> = REQUIRED_PATHS
            .iter()
            .chain(OPTIONAL_PATHS.iter())
            .map(|p| p.to_string())
            .collect();
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.interfaces = interfaces;
            state.bond_members = bond_members;
            state.directory = directory;
        }
        backend
    }

    /// Canonical fixture: a loopback, a two-member 5 Gbps bond, a tap, and
    /// `/if/punts` missing from the directory (as on older dataplanes).
    pub fn typical() -> Self {
        let iface = |name: &str, sw: u32, sup: u32, dev: &str, speed: u64, mac: &str| {
            SimInterface::new(InterfaceInfo {
                name: name.to_string(),
                sw_if_index: sw,
                sup_sw_if_index: sup,
                dev_type: dev.to_string(),
                admin_up: true,
                oper_up: true,
                mtu: 1500,
                mac: mac.to_string(),
                link_speed_kbps: speed,
            })
        };
        let interfaces = vec![
            iface("loop0", 0, 0, "Loopback", 0, "de:ad:00:00:00:00"),
            iface(
                "TenGigabitEthernet0/0/0",
                1,
                3,
                "dpdk",
                5_000_000,
                "de:ad:00:00:00:01",
            ),
            iface(
                "TenGigabitEthernet0/0/1",
                2,
                3,
                "dpdk",
                5_000_000,
                "de:ad:00:00:00:02",
            ),
            iface("BondEthernet0", 3, 3, "bond", 0, "de:ad:00:00:00:03"),
            iface("tap0", 4, 4, "virtio", 0, "de:ad:00:00:00:04"),
        ];
        let bond_members = BondMembership::from([(3, vec![1, 2])]);
        let backend = Self::new(interfaces, bond_members);
        backend.remove_path(super::IF_PUNTS);
        backend
    }

    pub fn clients(&self) -> (SimControlApi, SimStatsSegment) {
        (
            SimControlApi {
                state: self.state.clone(),
            },
            SimStatsSegment {
                state: self.state.clone(),
            },
        )
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn remove_path(&self, path: &str) {
        self.lock().directory.remove(path);
    }

    pub fn clear_bond_members(&self) {
        self.lock().bond_members.clear();
    }

    pub fn remove_interface(&self, name: &str) {
        self.lock().interfaces.retain(|i| i.info.name != name);
    }

    pub fn add_interface(&self, iface: SimInterface) {
        self.lock().interfaces.push(iface);
    }

    /// The next `n` `interfaces()` calls fail (one failed call fails the pass).
    pub fn fail_interfaces_calls(&self, n: u32) {
        self.lock().fail_interfaces_calls = n;
    }

    pub fn fail_api_connects(&self, n: u32) {
        self.lock().fail_api_connects = n;
    }

    pub fn fail_stats_connects(&self, n: u32) {
        self.lock().fail_stats_connects = n;
    }

    pub fn fail_reads(&self, n: u32) {
        self.lock().fail_reads = n;
    }

    pub fn api_connects(&self) -> u32 {
        self.lock().api_connects
    }

    pub fn api_disconnects(&self) -> u32 {
        self.lock().api_disconnects
    }

    pub fn stats_connects(&self) -> u32 {
        self.lock().stats_connects
    }

    pub fn stats_disconnects(&self) -> u32 {
        self.lock().stats_disconnects
    }
}

pub struct SimControlApi {
    state: Arc<Mutex<SimState>>,
}

pub struct SimStatsSegment {
    state: Arc<Mutex<SimState>>,
}

fn lock(state: &Arc<Mutex<SimState>>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl ControlApi for SimControlApi {
    async fn connect(&mut self) -> Result<(), VppError> {
        let mut state = lock(&self.state);
        if state.fail_api_connects > 0 {
            state.fail_api_connects -= 1;
            return Err(VppError::Connect("simulated api connect failure".into()));
        }
        state.api_connected = true;
        state.api_connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut state = lock(&self.state);
        if state.api_connected {
            state.api_connected = false;
            state.api_disconnects += 1;
        }
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).api_connected
    }

    async fn interfaces(&mut self) -> Result<HashMap<String, InterfaceInfo>, VppError> {
        let mut state = lock(&self.state);
        if !state.api_connected {
            return Err(VppError::NotConnected);
        }
        if state.fail_interfaces_calls > 0 {
            state.fail_interfaces_calls -= 1;
            return Err(VppError::Api("simulated interface dump failure".into()));
        }
        Ok(state
            .interfaces
            .iter()
            .map(|i| (i.info.name.clone(), i.info.clone()))
            .collect())
    }

    async fn bond_membership(&mut self) -> Result<BondMembership, VppError> {
        let state = lock(&self.state);
        if !state.api_connected {
            return Err(VppError::NotConnected);
        }
        Ok(state.bond_members.clone())
    }
}

#[async_trait]
impl StatsSegment for SimStatsSegment {
    async fn connect(&mut self) -> Result<(), VppError> {
        let mut state = lock(&self.state);
        if state.fail_stats_connects > 0 {
            state.fail_stats_connects -= 1;
            return Err(VppError::Connect("simulated stats connect failure".into()));
        }
        state.stats_connected = true;
        state.stats_connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut state = lock(&self.state);
        if state.stats_connected {
            state.stats_connected = false;
            state.stats_disconnects += 1;
        }
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).stats_connected
    }

    async fn directory(&mut self) -> Result<HashSet<String>, VppError> {
        let state = lock(&self.state);
        if !state.stats_connected {
            return Err(VppError::NotConnected);
        }
        Ok(state.directory.clone())
    }

    async fn interface_names(&mut self) -> Result<Vec<String>, VppError> {
        let mut state = lock(&self.state);
        if !state.stats_connected {
            return Err(VppError::NotConnected);
        }
        // One enumeration = one pass; advance the simulated clock.
        state.ticks += 1;
        Ok(state
            .interfaces
            .iter()
            .map(|i| i.info.name.clone())
            .collect())
    }

    async fn read(&mut self, path: &str, index: usize, agg: Aggregation) -> Result<u64, VppError> {
        let mut state = lock(&self.state);
        if !state.stats_connected {
            return Err(VppError::NotConnected);
        }
        if state.fail_reads > 0 {
            state.fail_reads -= 1;
            return Err(VppError::Read {
                path: path.to_string(),
                index,
                reason: "simulated read failure".into(),
            });
        }
        if !state.directory.contains(path) {
            return Err(VppError::Read {
                path: path.to_string(),
                index,
                reason: "unknown stats path".into(),
            });
        }
        let Some(iface) = state.interfaces.get(index) else {
            return Err(VppError::Read {
                path: path.to_string(),
                index,
                reason: "interface index out of range".into(),
            });
        };
        let ticks = state.ticks;
        let value = match path {
            IF_RX => match agg {
                Aggregation::SumPackets | Aggregation::Sum => ticks * iface.rx_rate.0,
                Aggregation::SumOctets => ticks * iface.rx_rate.1,
            },
            IF_TX => match agg {
                Aggregation::SumPackets | Aggregation::Sum => ticks * iface.tx_rate.0,
                Aggregation::SumOctets => ticks * iface.tx_rate.1,
            },
            _ => ticks * MISC_RATE + index as u64,
        };
        Ok(value)
    }
}
