// The protocol responder: answers every query cycle from the latest
// snapshot, never blocking on upstream I/O and never failing the transport.

use std::time::Duration;

use crate::collector::SharedSnapshot;
use crate::mib::{self, Record, SpeedCapPolicy};
use crate::transport::MasterTransport;

pub struct SnmpAgent {
    shared: SharedSnapshot,
    policy: SpeedCapPolicy,
}

impl SnmpAgent {
    pub fn new(shared: SharedSnapshot, policy: SpeedCapPolicy) -> Self {
        Self { shared, policy }
    }

    /// Registers the served subtrees with the master. Called once at startup.
    pub async fn setup<T: MasterTransport>(&self, transport: &mut T) -> anyhow::Result<()> {
        for subtree in mib::SUBTREES {
            transport.register(subtree).await?;
        }
        tracing::info!("agent setup complete");
        Ok(())
    }

    /// Builds the record set for one query cycle from the latest snapshot.
    /// Before the first successful sample this returns an empty set with a
    /// warning; the transport never sees an error.
    pub fn update(&self) -> Vec<Record> {
        let snapshot = self.shared.read();
        if snapshot.is_empty() {
            tracing::warn!("no interface data available yet, answering with an empty record set");
            return Vec::new();
        }
        let records = mib::synthesize(&snapshot, self.policy);
        tracing::debug!(
            interfaces = snapshot.interface_order.len(),
            records = records.len(),
            update_count = snapshot.update_count,
            "record set built"
        );
        records
    }

    /// Drives the periodic query cycle until the task is dropped. A failed
    /// publication is logged and the cycle continues with the next tick.
    pub async fn run<T: MasterTransport>(
        &self,
        transport: &mut T,
        period: Duration,
    ) -> anyhow::Result<()> {
        let mut tick = tokio::time::interval(period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            let records = self.update();
            if let Err(e) = transport.publish(&records).await {
                tracing::error!(error = %e, "record publication failed");
            }
        }
    }
}
