// Background sampling worker (same role as the Python VPPDataCollector).
// Owns both VPP connections; the only writer of the published snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::models::{BondMembership, InterfaceCounters, InterfaceInfo, Snapshot};
use crate::vpp::accessor::StatAccessor;
use crate::vpp::{self, Aggregation, ControlApi, StatsSegment, VppError};

/// Protocol index of the first interface row.
pub const BASE_IF_INDEX: u32 = 1000;

/// Consecutive failed passes tolerated before forcing a full reconnect.
pub const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Default pause after a failed pass below the reconnect threshold.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Default pause after a forced disconnect, before reconnecting.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Readiness gate: attempts x delay bounds how long startup may wait for the
/// first successful pass.
pub const READY_ATTEMPTS: u32 = 30;
pub const READY_POLL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct SharedState {
    snapshot: Snapshot,
    fatal: Option<String>,
}

/// Handle to the latest published snapshot. The lock guards only the swap and
/// the read-side clone; it is never held across upstream I/O or synthesis.
#[derive(Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<SharedState>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SharedState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Defensive copy of the latest snapshot.
    pub fn read(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    fn publish(&self, pass: PassData) {
        let mut state = self.lock();
        let update_count = state.snapshot.update_count + 1;
        let error_count = state.snapshot.error_count;
        state.snapshot = Snapshot {
            interfaces: pass.interfaces,
            interface_stats: pass.interface_stats,
            interface_order: pass.interface_order,
            bond_members: pass.bond_members,
            if_index: pass.if_index,
            last_update: unix_now(),
            update_count,
            error_count,
        };
    }

    fn record_error(&self) {
        self.lock().snapshot.error_count += 1;
    }

    fn set_fatal(&self, reason: String) {
        self.lock().fatal = Some(reason);
    }

    pub fn fatal(&self) -> Option<String> {
        self.lock().fatal.clone()
    }
}

/// Persistent protocol index assignment: an interface keeps its index for the
/// collector's lifetime, and indices of removed interfaces are never reused.
#[derive(Debug, Default)]
pub struct IndexAllocator {
    map: HashMap<String, u32>,
}

impl IndexAllocator {
    pub fn assign(&mut self, names: &[String]) {
        for name in names {
            if !self.map.contains_key(name) {
                let idx = BASE_IF_INDEX + self.map.len() as u32;
                self.map.insert(name.clone(), idx);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.map.get(name).copied()
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub poll_interval: Duration,
    /// Deadline for each socket-backed upstream call.
    pub timeout: Duration,
    pub retry_backoff: Duration,
    pub reconnect_backoff: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(5),
            retry_backoff: RETRY_BACKOFF,
            reconnect_backoff: RECONNECT_BACKOFF,
        }
    }
}

/// One fully collected pass, not yet published.
struct PassData {
    interfaces: HashMap<String, InterfaceInfo>,
    interface_stats: HashMap<String, InterfaceCounters>,
    interface_order: Vec<String>,
    bond_members: BondMembership,
    if_index: HashMap<String, u32>,
}

/// Spawns the sampling loop. The task owns both clients and releases them on
/// every exit path; `shared` is the only state visible to the responder.
pub fn spawn<A, S>(
    mut api: A,
    mut stats: S,
    shared: SharedSnapshot,
    config: CollectorConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> JoinHandle<()>
where
    A: ControlApi + 'static,
    S: StatsSegment + 'static,
{
    tracing::info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        "data collector started"
    );
    tokio::spawn(async move {
        let mut indices = IndexAllocator::default();
        let mut consecutive_errors: u32 = 0;

        loop {
            let pause = match run_pass(&mut api, &mut stats, &shared, &mut indices, &config).await {
                Ok(()) => {
                    consecutive_errors = 0;
                    config.poll_interval
                }
                Err(e) => {
                    shared.record_error();
                    consecutive_errors += 1;
                    tracing::error!(
                        error = %e,
                        attempt = consecutive_errors,
                        max = MAX_CONSECUTIVE_ERRORS,
                        "sampling pass failed"
                    );
                    if let VppError::MissingRequired(_) = e {
                        shared.set_fatal(e.to_string());
                        break;
                    }
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        tracing::error!("too many consecutive poll errors, reconnecting");
                        api.disconnect();
                        stats.disconnect();
                        consecutive_errors = 0;
                        config.reconnect_backoff
                    } else {
                        config.retry_backoff
                    }
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut shutdown_rx => break,
            }
        }

        api.disconnect();
        stats.disconnect();
        tracing::info!("data collector stopped");
    })
}

/// Blocks startup until the first successful pass, a fatal collector error,
/// or the bounded attempts run out; initialization fails instead of hanging.
pub async fn wait_until_ready(shared: &SharedSnapshot) -> anyhow::Result<Snapshot> {
    for _ in 0..READY_ATTEMPTS {
        if let Some(reason) = shared.fatal() {
            anyhow::bail!("collector failed fatally during startup: {reason}");
        }
        let snapshot = shared.read();
        if !snapshot.is_empty() {
            return Ok(snapshot);
        }
        tokio::time::sleep(READY_POLL_DELAY).await;
    }
    anyhow::bail!(
        "no data from VPP after {} polls; is the dataplane running?",
        READY_ATTEMPTS
    )
}

async fn run_pass<A, S>(
    api: &mut A,
    stats: &mut S,
    shared: &SharedSnapshot,
    indices: &mut IndexAllocator,
    config: &CollectorConfig,
) -> Result<(), VppError>
where
    A: ControlApi,
    S: StatsSegment,
{
    if !api.is_connected() {
        tracing::debug!("connecting to VPP API");
        with_timeout(config.timeout, api.connect()).await?;
        tracing::info!("connected to VPP API");
    }
    if !stats.is_connected() {
        tracing::debug!("connecting to VPP stats segment");
        with_timeout(config.timeout, stats.connect()).await?;
        let directory = with_timeout(config.timeout, stats.directory()).await?;
        vpp::validate_directory(&directory)?;
        tracing::info!("connected to VPP stats segment");
    }

    let interfaces = with_timeout(config.timeout, api.interfaces()).await?;

    // Best effort: speed derivation falls back to heuristics without it.
    let bond_members = match with_timeout(config.timeout, api.bond_membership()).await {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "bond membership dump unavailable");
            BondMembership::new()
        }
    };

    let directory = with_timeout(config.timeout, stats.directory()).await?;
    let interface_order = with_timeout(config.timeout, stats.interface_names()).await?;

    let interface_stats =
        collect_counters(stats, &directory, &interface_order).await?;

    indices.assign(&interface_order);
    let if_index = indices.map.clone();

    let interface_count = interface_order.len();
    shared.publish(PassData {
        interfaces,
        interface_stats,
        interface_order,
        bond_members,
        if_index,
    });
    tracing::debug!(interfaces = interface_count, "snapshot published");
    Ok(())
}

/// Reads the counter record for every enumerated interface. The rx/tx
/// combined counters are required paths and read directly; everything else
/// goes through the accessor with a 0 default.
async fn collect_counters<S: StatsSegment>(
    stats: &mut S,
    directory: &HashSet<String>,
    names: &[String],
) -> Result<HashMap<String, InterfaceCounters>, VppError> {
    let mut out = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let rx_packets = stats.read(vpp::IF_RX, i, Aggregation::SumPackets).await?;
        let rx_octets = stats.read(vpp::IF_RX, i, Aggregation::SumOctets).await?;
        let tx_packets = stats.read(vpp::IF_TX, i, Aggregation::SumPackets).await?;
        let tx_octets = stats.read(vpp::IF_TX, i, Aggregation::SumOctets).await?;

        let mut accessor = StatAccessor::new(stats, directory);
        let counters = InterfaceCounters {
            rx_packets,
            rx_octets,
            rx_errors: accessor.get(vpp::IF_RX_ERROR, i, Aggregation::Sum, 0).await,
            rx_no_buf: accessor.get(vpp::IF_RX_NO_BUF, i, Aggregation::Sum, 0).await,
            rx_multicast: accessor
                .get(vpp::IF_RX_MULTICAST, i, Aggregation::SumPackets, 0)
                .await,
            rx_broadcast: accessor
                .get(vpp::IF_RX_BROADCAST, i, Aggregation::SumPackets, 0)
                .await,
            tx_packets,
            tx_octets,
            tx_errors: accessor.get(vpp::IF_TX_ERROR, i, Aggregation::Sum, 0).await,
            tx_multicast: accessor
                .get(vpp::IF_TX_MULTICAST, i, Aggregation::SumPackets, 0)
                .await,
            tx_broadcast: accessor
                .get(vpp::IF_TX_BROADCAST, i, Aggregation::SumPackets, 0)
                .await,
            drops: accessor.get(vpp::IF_DROPS, i, Aggregation::Sum, 0).await,
            punts: accessor.get(vpp::IF_PUNTS, i, Aggregation::Sum, 0).await,
            timestamp: unix_now(),
        };
        out.insert(name.clone(), counters);
    }
    Ok(out)
}

async fn with_timeout<T>(
    deadline: Duration,
    fut: impl Future<Output = Result<T, VppError>>,
) -> Result<T, VppError> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(VppError::Timeout(deadline.as_secs())),
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "system time error");
            0
        })
}
