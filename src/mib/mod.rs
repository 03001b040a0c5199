// Record synthesis: one snapshot in, one ifTable + ifXTable row set out.

mod value;

pub use value::{Record, Value, wrap32};

use serde::Deserialize;

use crate::models::{Snapshot, UNKNOWN_MAC};
use crate::speed::resolve_speed_kbps;

/// ifEntry subtree (RFC 1213 ifTable).
pub const IF_TABLE: &str = "1.3.6.1.2.1.2.2.1";

/// ifXEntry subtree (RFC 2863 ifXTable, high-capacity counters).
pub const IF_X_TABLE: &str = "1.3.6.1.2.1.31.1.1.1";

/// The two subtrees this agent registers with the master.
pub const SUBTREES: [&str; 2] = [IF_TABLE, IF_X_TABLE];

const IF_TYPE_SOFTWARE_LOOPBACK: i32 = 24;
const IF_TYPE_ETHERNET_CSMACD: i32 = 6;

const STATUS_UP: i32 = 1;
const STATUS_DOWN: i32 = 2;

/// What to put in the 32-bit ifSpeed field when the true speed in bits/sec
/// does not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedCapPolicy {
    /// Emit 0, directing consumers to the 64-bit ifHighSpeed field.
    #[default]
    Zero,
    /// Emit 2^32 - 1.
    Saturate,
}

/// Builds the full record set for `snapshot`, one row per interface in
/// enumeration order, at its persistent protocol index.
///
/// An interface without a counter record still gets a row with zeroed
/// counters; an interface without metadata still gets a row with placeholder
/// identity.
pub fn synthesize(snapshot: &Snapshot, policy: SpeedCapPolicy) -> Vec<Record> {
    let mut records = Vec::with_capacity(snapshot.interface_order.len() * 37);
    for name in &snapshot.interface_order {
        let Some(&idx) = snapshot.if_index.get(name) else {
            tracing::warn!(interface = %name, "no protocol index assigned, skipping row");
            continue;
        };
        synthesize_interface(snapshot, name, idx, policy, &mut records);
    }
    records
}

fn synthesize_interface(
    snapshot: &Snapshot,
    name: &str,
    idx: u32,
    policy: SpeedCapPolicy,
    records: &mut Vec<Record>,
) {
    let stats = snapshot
        .interface_stats
        .get(name)
        .cloned()
        .unwrap_or_default();

    let (mtu, mac, admin_status, oper_status) = match snapshot.interfaces.get(name) {
        Some(iface) => (
            iface.mtu,
            iface.mac.clone(),
            if iface.admin_up { STATUS_UP } else { STATUS_DOWN },
            if iface.oper_up { STATUS_UP } else { STATUS_DOWN },
        ),
        None => (0, UNKNOWN_MAC.to_string(), STATUS_DOWN, STATUS_DOWN),
    };

    let if_type = if name.starts_with("loop") {
        IF_TYPE_SOFTWARE_LOOPBACK
    } else {
        IF_TYPE_ETHERNET_CSMACD
    };

    let speed_kbps = resolve_speed_kbps(name, &snapshot.interfaces, &snapshot.bond_members);
    let speed_bps = speed_kbps.saturating_mul(1000);
    let speed_32 = if speed_bps < (1u64 << 32) {
        speed_bps as u32
    } else {
        match policy {
            SpeedCapPolicy::Zero => 0,
            SpeedCapPolicy::Saturate => u32::MAX,
        }
    };
    let speed_mbps = speed_bps / 1_000_000;

    let mut push = |base: &str, column: u32, value: Value| {
        records.push(Record::row(base, column, idx, value));
    };

    // ifTable identity and status
    push(IF_TABLE, 1, Value::Integer(idx as i32));
    push(IF_TABLE, 2, Value::OctetString(name.to_string()));
    push(IF_TABLE, 3, Value::Integer(if_type));
    push(IF_TABLE, 4, Value::Integer(mtu as i32));
    push(IF_TABLE, 5, Value::Gauge32(speed_32));
    push(IF_TABLE, 6, Value::OctetString(mac));
    push(IF_TABLE, 7, Value::Integer(admin_status));
    push(IF_TABLE, 8, Value::Integer(oper_status));
    push(IF_TABLE, 9, Value::TimeTicks(0));

    // ifTable legacy 32-bit counters
    push(IF_TABLE, 10, Value::Counter32(wrap32(stats.rx_octets)));
    push(IF_TABLE, 11, Value::Counter32(wrap32(stats.rx_packets)));
    push(IF_TABLE, 12, Value::Counter32(wrap32(stats.rx_multicast)));
    push(IF_TABLE, 13, Value::Counter32(wrap32(stats.rx_no_buf)));
    push(IF_TABLE, 14, Value::Counter32(wrap32(stats.rx_errors)));
    push(IF_TABLE, 16, Value::Counter32(wrap32(stats.tx_octets)));
    push(IF_TABLE, 17, Value::Counter32(wrap32(stats.tx_packets)));
    push(IF_TABLE, 18, Value::Counter32(wrap32(stats.tx_multicast)));
    push(IF_TABLE, 19, Value::Counter32(wrap32(stats.drops)));
    push(IF_TABLE, 20, Value::Counter32(wrap32(stats.tx_errors)));

    // ifXTable
    push(IF_X_TABLE, 1, Value::OctetString(name.to_string()));
    push(IF_X_TABLE, 2, Value::Counter32(wrap32(stats.rx_multicast)));
    push(IF_X_TABLE, 3, Value::Counter32(wrap32(stats.rx_broadcast)));
    push(IF_X_TABLE, 4, Value::Counter32(wrap32(stats.tx_multicast)));
    push(IF_X_TABLE, 5, Value::Counter32(wrap32(stats.tx_broadcast)));
    push(IF_X_TABLE, 6, Value::Counter64(stats.rx_octets));
    push(IF_X_TABLE, 7, Value::Counter64(stats.rx_packets));
    push(IF_X_TABLE, 8, Value::Counter64(stats.rx_multicast));
    push(IF_X_TABLE, 9, Value::Counter64(stats.rx_broadcast));
    push(IF_X_TABLE, 10, Value::Counter64(stats.tx_octets));
    push(IF_X_TABLE, 11, Value::Counter64(stats.tx_packets));
    push(IF_X_TABLE, 12, Value::Counter64(stats.tx_multicast));
    push(IF_X_TABLE, 13, Value::Counter64(stats.tx_broadcast));
    push(IF_X_TABLE, 15, Value::Counter64(speed_mbps));
    push(IF_X_TABLE, 16, Value::Integer(2)); // promiscuous: false
    push(IF_X_TABLE, 17, Value::Integer(1)); // connector present: true
    push(IF_X_TABLE, 18, Value::OctetString(name.to_string()));
    push(IF_X_TABLE, 19, Value::TimeTicks(0));
}
