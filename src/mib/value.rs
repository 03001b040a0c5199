// Typed values for addressable records, mirroring the AgentX value kinds the
// transport understands.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    Integer(i32),
    OctetString(String),
    Counter32(u32),
    Gauge32(u32),
    Counter64(u64),
    TimeTicks(u32),
}

/// One addressable record: a fully qualified OID plus its typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub oid: String,
    pub value: Value,
}

impl Record {
    /// Record for `column` of the table rooted at `base`, row `index`.
    pub fn row(base: &str, column: u32, index: u32, value: Value) -> Self {
        Self {
            oid: format!("{base}.{column}.{index}"),
            value,
        }
    }
}

/// Legacy 32-bit counter encoding: `value mod 2^32`. Wraparound, not
/// saturation.
pub fn wrap32(value: u64) -> u32 {
    (value & 0xFFFF_FFFF) as u32
}
