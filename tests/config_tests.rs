// Config loading, merging and validation tests

use vpp_snmp_agent::config::AgentConfig;
use vpp_snmp_agent::mib::SpeedCapPolicy;

const VALID_CONFIG: &str = r#"
[agent]
address = "0.0.0.0:705"
speed_cap = "saturate"

[polling]
period_secs = 10
timeout_secs = 3
"#;

#[test]
fn test_config_defaults_without_file() {
    let config = AgentConfig::load(None);
    assert_eq!(config.agent.address, "localhost:705");
    assert_eq!(config.agent.speed_cap, SpeedCapPolicy::Zero);
    assert_eq!(config.polling.period_secs, 5);
    assert_eq!(config.polling.timeout_secs, 5);
}

#[test]
fn test_config_loads_from_str() {
    let config = AgentConfig::load_from_str(VALID_CONFIG);
    assert_eq!(config.agent.address, "0.0.0.0:705");
    assert_eq!(config.agent.speed_cap, SpeedCapPolicy::Saturate);
    assert_eq!(config.polling.period_secs, 10);
    assert_eq!(config.polling.timeout_secs, 3);
}

#[test]
fn test_config_partial_file_keeps_defaults() {
    let config = AgentConfig::load_from_str("[polling]\nperiod_secs = 2\n");
    assert_eq!(config.polling.period_secs, 2);
    assert_eq!(config.polling.timeout_secs, 5);
    assert_eq!(config.agent.address, "localhost:705");
}

#[test]
fn test_config_ignores_unknown_keys() {
    let with_extras = format!("{VALID_CONFIG}\n[agent.extra]\nfoo = 1\n");
    let config = AgentConfig::load_from_str(&with_extras);
    assert_eq!(config.polling.period_secs, 10);
}

#[test]
fn test_config_malformed_file_falls_back_to_defaults() {
    let config = AgentConfig::load_from_str("not valid toml [[[");
    assert_eq!(config.agent.address, "localhost:705");
    assert_eq!(config.polling.period_secs, 5);
}

#[test]
fn test_config_unreadable_file_falls_back_to_defaults() {
    let config = AgentConfig::load(Some(std::path::Path::new("/nonexistent/agent.toml")));
    assert_eq!(config.polling.period_secs, 5);
}

#[test]
fn test_config_loads_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("agent.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    let config = AgentConfig::load(Some(&path));
    assert_eq!(config.agent.address, "0.0.0.0:705");
    assert_eq!(config.polling.period_secs, 10);
}

#[test]
fn test_config_cli_overrides_win() {
    let mut config = AgentConfig::load_from_str(VALID_CONFIG);
    config.apply_overrides(Some("127.0.0.1:10705".into()), Some(2), None);
    assert_eq!(config.agent.address, "127.0.0.1:10705");
    assert_eq!(config.polling.period_secs, 2);
    // untouched by the partial override
    assert_eq!(config.polling.timeout_secs, 3);
}

#[test]
fn test_config_validation_rejects_zero_period() {
    let mut config = AgentConfig::default();
    config.apply_overrides(None, Some(0), None);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("period_secs"));
}

#[test]
fn test_config_validation_rejects_zero_timeout() {
    let mut config = AgentConfig::default();
    config.apply_overrides(None, None, Some(0));
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

#[test]
fn test_config_validation_rejects_empty_address() {
    let mut config = AgentConfig::default();
    config.apply_overrides(Some(String::new()), None, None);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("agent.address"));
}

#[test]
fn test_config_validation_accepts_defaults() {
    AgentConfig::default().validate().expect("defaults valid");
}
