// Shared test helpers

use std::collections::HashMap;

use vpp_snmp_agent::collector::BASE_IF_INDEX;
use vpp_snmp_agent::models::{InterfaceInfo, Snapshot};

pub fn iface(
    name: &str,
    sw_if_index: u32,
    sup_sw_if_index: u32,
    dev_type: &str,
    link_speed_kbps: u64,
) -> InterfaceInfo {
    InterfaceInfo {
        name: name.into(),
        sw_if_index,
        sup_sw_if_index,
        dev_type: dev_type.into(),
        admin_up: true,
        oper_up: true,
        mtu: 1500,
        mac: "02:fe:00:00:00:01".into(),
        link_speed_kbps,
    }
}

pub fn iface_map(interfaces: Vec<InterfaceInfo>) -> HashMap<String, InterfaceInfo> {
    interfaces
        .into_iter()
        .map(|i| (i.name.clone(), i))
        .collect()
}

/// Snapshot with the given interfaces in order, indices assigned from
/// `BASE_IF_INDEX`, and no counter records (tests fill those in as needed).
pub fn snapshot(interfaces: Vec<InterfaceInfo>) -> Snapshot {
    let interface_order: Vec<String> = interfaces.iter().map(|i| i.name.clone()).collect();
    let if_index = interface_order
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), BASE_IF_INDEX + i as u32))
        .collect();
    Snapshot {
        interfaces: iface_map(interfaces),
        interface_stats: HashMap::new(),
        interface_order,
        bond_members: Default::default(),
        if_index,
        last_update: 1,
        update_count: 1,
        error_count: 0,
    }
}
