// Domain models (ported from the Python agent)

mod interface;
mod snapshot;

pub use interface::{InterfaceInfo, UNKNOWN_MAC};
pub use snapshot::{BondMembership, InterfaceCounters, Snapshot};
