// Interface metadata as reported by the VPP control API

use serde::{Deserialize, Serialize};

/// Placeholder MAC for interfaces whose metadata is unavailable.
pub const UNKNOWN_MAC: &str = "00:00:00:00:00:00";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceInfo {
    pub name: String,
    pub sw_if_index: u32,
    /// Supervising interface; equals `sw_if_index` for principal interfaces,
    /// points at the bond for member links.
    pub sup_sw_if_index: u32,
    /// Device type string from the API, e.g. "dpdk", "bond", "Loopback".
    pub dev_type: String,
    pub admin_up: bool,
    pub oper_up: bool,
    pub mtu: u32,
    pub mac: String,
    /// Nominal link speed in Kbps as reported; 0 when the device does not report one.
    pub link_speed_kbps: u64,
}

impl InterfaceInfo {
    /// True when this interface is the principal (non-member) side of a bond group.
    pub fn is_bond_principal(&self) -> bool {
        self.dev_type == "bond" && self.sw_if_index == self.sup_sw_if_index
    }
}
