// Speed resolution tests: sentinel interfaces, bond derivation, fallbacks

mod common;

use common::{iface, iface_map};
use vpp_snmp_agent::models::BondMembership;
use vpp_snmp_agent::speed::{
    DEFAULT_BOND_SPEED_KBPS, LOOPBACK_SPEED_KBPS, member_speeds_from_map, member_speeds_heuristic,
    resolve_speed_kbps,
};

#[test]
fn test_loopback_sentinel_ignores_reported_speed() {
    let interfaces = iface_map(vec![iface("loop0", 0, 0, "Loopback", 42_000)]);
    let speed = resolve_speed_kbps("loop0", &interfaces, &BondMembership::new());
    assert_eq!(speed, LOOPBACK_SPEED_KBPS);
}

#[test]
fn test_tap_sentinel_case_insensitive() {
    let interfaces = iface_map(vec![iface("Tap0", 0, 0, "virtio", 0)]);
    assert_eq!(
        resolve_speed_kbps("Tap0", &interfaces, &BondMembership::new()),
        LOOPBACK_SPEED_KBPS
    );
    // even without metadata, the name alone decides
    assert_eq!(
        resolve_speed_kbps("tap9", &iface_map(vec![]), &BondMembership::new()),
        LOOPBACK_SPEED_KBPS
    );
}

#[test]
fn test_reported_speed_wins() {
    let interfaces = iface_map(vec![iface(
        "TenGigabitEthernet0/0/0",
        1,
        1,
        "dpdk",
        10_000_000,
    )]);
    assert_eq!(
        resolve_speed_kbps(
            "TenGigabitEthernet0/0/0",
            &interfaces,
            &BondMembership::new()
        ),
        10_000_000
    );
}

#[test]
fn test_unknown_interface_is_zero() {
    assert_eq!(
        resolve_speed_kbps("HundredGigE0/0/0", &iface_map(vec![]), &BondMembership::new()),
        0
    );
}

#[test]
fn test_bond_sums_member_speeds_from_map() {
    let interfaces = iface_map(vec![
        iface("BondEthernet0", 3, 3, "bond", 0),
        iface("TenGigabitEthernet0/0/0", 1, 3, "dpdk", 10_000_000),
        iface("TenGigabitEthernet0/0/1", 2, 3, "dpdk", 10_000_000),
    ]);
    let members = BondMembership::from([(3, vec![1, 2])]);
    assert_eq!(
        resolve_speed_kbps("BondEthernet0", &interfaces, &members),
        20_000_000
    );
}

#[test]
fn test_bond_skips_members_without_speed() {
    let interfaces = iface_map(vec![
        iface("BondEthernet0", 3, 3, "bond", 0),
        iface("TenGigabitEthernet0/0/0", 1, 3, "dpdk", 10_000_000),
        iface("TenGigabitEthernet0/0/1", 2, 3, "dpdk", 0),
    ]);
    let members = BondMembership::from([(3, vec![1, 2])]);
    assert_eq!(
        resolve_speed_kbps("BondEthernet0", &interfaces, &members),
        10_000_000
    );
}

#[test]
fn test_bond_without_members_defaults_when_admin_up() {
    let interfaces = iface_map(vec![iface("BondEthernet0", 3, 3, "bond", 0)]);
    assert_eq!(
        resolve_speed_kbps("BondEthernet0", &interfaces, &BondMembership::new()),
        DEFAULT_BOND_SPEED_KBPS
    );
}

#[test]
fn test_bond_without_members_zero_when_admin_down() {
    let mut bond = iface("BondEthernet0", 3, 3, "bond", 0);
    bond.admin_up = false;
    let interfaces = iface_map(vec![bond]);
    assert_eq!(
        resolve_speed_kbps("BondEthernet0", &interfaces, &BondMembership::new()),
        0
    );
}

#[test]
fn test_bond_member_side_is_not_derived() {
    // a bond member (sup points at the principal) with no speed stays 0
    let interfaces = iface_map(vec![
        iface("BondEthernet0", 3, 3, "bond", 0),
        iface("TenGigabitEthernet0/0/0", 1, 3, "dpdk", 0),
    ]);
    assert_eq!(
        resolve_speed_kbps(
            "TenGigabitEthernet0/0/0",
            &interfaces,
            &BondMembership::new()
        ),
        0
    );
}

#[test]
fn test_heuristic_fallback_via_parent_index() {
    // no membership map entry: members are found through sup_sw_if_index
    let interfaces = iface_map(vec![
        iface("BondEthernet0", 3, 3, "bond", 0),
        iface("TenGigabitEthernet0/0/0", 1, 3, "dpdk", 10_000_000),
        iface("TenGigabitEthernet0/0/1", 2, 3, "dpdk", 10_000_000),
    ]);
    assert_eq!(
        resolve_speed_kbps("BondEthernet0", &interfaces, &BondMembership::new()),
        20_000_000
    );
}

#[test]
fn test_heuristic_fallback_via_name_prefix() {
    let interfaces = iface_map(vec![
        iface("bond0", 3, 3, "bond", 0),
        iface("bond0-eth0", 1, 1, "dpdk", 25_000_000),
        iface("bond0.100", 2, 2, "dpdk", 25_000_000),
    ]);
    assert_eq!(
        resolve_speed_kbps("bond0", &interfaces, &BondMembership::new()),
        50_000_000
    );
}

#[test]
fn test_member_speeds_from_map_empty_without_entry() {
    let bond = iface("BondEthernet0", 3, 3, "bond", 0);
    let interfaces = iface_map(vec![
        bond.clone(),
        iface("TenGigabitEthernet0/0/0", 1, 3, "dpdk", 10_000_000),
    ]);
    let speeds = member_speeds_from_map(&bond, &interfaces, &BondMembership::new());
    assert!(speeds.is_empty());
}

#[test]
fn test_member_speeds_heuristic_excludes_other_bonds() {
    let bond = iface("BondEthernet0", 3, 3, "bond", 0);
    let interfaces = iface_map(vec![
        bond.clone(),
        iface("BondEthernet1", 5, 3, "bond", 10_000_000),
        iface("TenGigabitEthernet0/0/0", 1, 3, "dpdk", 10_000_000),
    ]);
    let speeds = member_speeds_heuristic(&bond, &interfaces);
    assert_eq!(speeds, vec![10_000_000]);
}
