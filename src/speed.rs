// Nominal link speed resolution, including aggregate speed for bond
// interfaces derived from their member links.

use std::collections::HashMap;

use crate::models::{BondMembership, InterfaceInfo};

/// Fixed speed reported for loopback and tap interfaces, in Kbps (1 Gbps).
pub const LOOPBACK_SPEED_KBPS: u64 = 1_000_000;

/// Fallback for an admin-up bond whose members expose no speed, in Kbps (1 Gbps).
pub const DEFAULT_BOND_SPEED_KBPS: u64 = 1_000_000;

/// Resolves the nominal speed of `name` in Kbps.
///
/// Rule order matters: the loopback/tap sentinel is unconditional, an
/// explicitly reported speed always wins over derivation, and 0 is only
/// returned when no signal exists at all.
pub fn resolve_speed_kbps(
    name: &str,
    interfaces: &HashMap<String, InterfaceInfo>,
    bond_members: &BondMembership,
) -> u64 {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("loop") || lower.starts_with("tap") {
        return LOOPBACK_SPEED_KBPS;
    }

    let Some(iface) = interfaces.get(name) else {
        tracing::warn!(interface = name, "no metadata for interface, speed unknown");
        return 0;
    };

    if iface.link_speed_kbps > 0 {
        return iface.link_speed_kbps;
    }

    if iface.is_bond_principal() {
        let mut speeds = member_speeds_from_map(iface, interfaces, bond_members);
        if speeds.is_empty() {
            speeds = member_speeds_heuristic(iface, interfaces);
        }
        if !speeds.is_empty() {
            let total: u64 = speeds.iter().sum();
            tracing::debug!(
                bond = name,
                members = speeds.len(),
                total_kbps = total,
                "derived bond speed from members"
            );
            return total;
        }
        if iface.admin_up {
            tracing::warn!(
                bond = name,
                "bond is admin up but no member speed is known, defaulting to 1 Gbps"
            );
            return DEFAULT_BOND_SPEED_KBPS;
        }
        return 0;
    }

    0
}

/// Positive member speeds via the bond membership dump. Empty when the dump
/// has no entry for this bond or no member reports a speed.
pub fn member_speeds_from_map(
    bond: &InterfaceInfo,
    interfaces: &HashMap<String, InterfaceInfo>,
    bond_members: &BondMembership,
) -> Vec<u64> {
    let Some(members) = bond_members.get(&bond.sw_if_index) else {
        return Vec::new();
    };
    members
        .iter()
        .filter_map(|member_idx| {
            interfaces
                .values()
                .find(|i| i.sw_if_index == *member_idx)
                .map(|i| i.link_speed_kbps)
        })
        .filter(|speed| *speed > 0)
        .collect()
}

/// Fallback when membership data is unavailable: member links point at the
/// bond through `sup_sw_if_index`, or follow the `<bond>.`/`<bond>-` naming
/// convention.
pub fn member_speeds_heuristic(
    bond: &InterfaceInfo,
    interfaces: &HashMap<String, InterfaceInfo>,
) -> Vec<u64> {
    let dot = format!("{}.", bond.name);
    let dash = format!("{}-", bond.name);
    interfaces
        .values()
        .filter(|i| i.sw_if_index != bond.sw_if_index)
        .filter(|i| {
            (i.dev_type != "bond" && i.sup_sw_if_index == bond.sw_if_index)
                || i.name.starts_with(&dot)
                || i.name.starts_with(&dash)
        })
        .map(|i| i.link_speed_kbps)
        .filter(|speed| *speed > 0)
        .collect()
}
