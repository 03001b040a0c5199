// Boundary toward the management transport (AgentX master). The wire
// protocol lives outside this crate; the agent only registers subtrees and
// hands over record sets.

use async_trait::async_trait;

use crate::mib::Record;

#[async_trait]
pub trait MasterTransport: Send {
    /// Registers one addressable subtree with the master. Called once per
    /// subtree during agent setup.
    async fn register(&mut self, subtree: &str) -> anyhow::Result<()>;

    /// Hands the full current record set to the master for one query cycle.
    async fn publish(&mut self, records: &[Record]) -> anyhow::Result<()>;
}

/// Standalone transport: logs registrations and record sets instead of
/// speaking to a master. Used by the binary when no master is involved and
/// by the oneshot dump mode.
#[derive(Debug, Default)]
pub struct LogTransport {
    /// Master address this transport stands in for.
    address: String,
    /// Print every record as a JSON line on stdout.
    dump_json: bool,
}

impl LogTransport {
    pub fn new(address: impl Into<String>, dump_json: bool) -> Self {
        Self {
            address: address.into(),
            dump_json,
        }
    }
}

#[async_trait]
impl MasterTransport for LogTransport {
    async fn register(&mut self, subtree: &str) -> anyhow::Result<()> {
        tracing::info!(subtree, master = %self.address, "registered subtree");
        Ok(())
    }

    async fn publish(&mut self, records: &[Record]) -> anyhow::Result<()> {
        tracing::debug!(records = records.len(), "record set published");
        if self.dump_json {
            let mut out = String::with_capacity(records.len() * 64);
            for record in records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            print!("{out}");
        }
        Ok(())
    }
}
