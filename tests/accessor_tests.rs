// StatAccessor and directory validation tests

use vpp_snmp_agent::vpp::accessor::StatAccessor;
use vpp_snmp_agent::vpp::sim::SimBackend;
use vpp_snmp_agent::vpp::{self, Aggregation, StatsSegment, VppError};

#[tokio::test]
async fn test_accessor_returns_default_for_missing_path() {
    let backend = SimBackend::typical(); // /if/punts is absent
    let (_, mut stats) = backend.clients();
    stats.connect().await.unwrap();
    // advance one pass so present paths would read non-zero
    stats.interface_names().await.unwrap();
    let directory = stats.directory().await.unwrap();

    let mut accessor = StatAccessor::new(&mut stats, &directory);
    let value = accessor.get(vpp::IF_PUNTS, 0, Aggregation::Sum, 7).await;
    assert_eq!(value, 7);
}

#[tokio::test]
async fn test_accessor_returns_default_on_read_error() {
    let backend = SimBackend::typical();
    let (_, mut stats) = backend.clients();
    stats.connect().await.unwrap();
    stats.interface_names().await.unwrap();
    let directory = stats.directory().await.unwrap();

    backend.fail_reads(1);
    let mut accessor = StatAccessor::new(&mut stats, &directory);
    let value = accessor.get(vpp::IF_DROPS, 0, Aggregation::Sum, 42).await;
    assert_eq!(value, 42);

    // next read succeeds again
    let value = accessor.get(vpp::IF_DROPS, 0, Aggregation::Sum, 42).await;
    assert_ne!(value, 42);
}

#[tokio::test]
async fn test_accessor_reads_present_path() {
    let backend = SimBackend::typical();
    let (_, mut stats) = backend.clients();
    stats.connect().await.unwrap();
    stats.interface_names().await.unwrap();
    let directory = stats.directory().await.unwrap();

    let mut accessor = StatAccessor::new(&mut stats, &directory);
    let value = accessor
        .get(vpp::IF_RX, 0, Aggregation::SumPackets, 0)
        .await;
    assert!(value > 0);
}

#[test]
fn test_validate_directory_accepts_full_set() {
    let directory = vpp::REQUIRED_PATHS
        .iter()
        .chain(vpp::OPTIONAL_PATHS.iter())
        .map(|p| p.to_string())
        .collect();
    vpp::validate_directory(&directory).expect("full directory is valid");
}

#[test]
fn test_validate_directory_tolerates_missing_optional_paths() {
    let directory = vpp::REQUIRED_PATHS.iter().map(|p| p.to_string()).collect();
    vpp::validate_directory(&directory).expect("required-only directory is valid");
}

#[test]
fn test_validate_directory_rejects_missing_required_path() {
    let directory = [vpp::IF_NAMES, vpp::IF_TX]
        .iter()
        .map(|p| p.to_string())
        .collect();
    let err = vpp::validate_directory(&directory).unwrap_err();
    match err {
        VppError::MissingRequired(paths) => assert_eq!(paths, vec![vpp::IF_RX.to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}
