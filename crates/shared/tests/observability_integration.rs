//! 可观测性模块集成测试

use coalesce_shared::config::AppConfig;
use coalesce_shared::observability::{init, ObservabilityConfig};

#[test]
fn test_init_once_per_process() {
    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        log_format: "json".to_string(),
        ..Default::default()
    }
    .with_service_name("coalesce-test");

    let guard = init(&config);
    assert!(guard.is_ok());

    // 全局 subscriber 只能安装一次
    assert!(init(&config).is_err());
}

#[test]
fn test_app_config_carries_observability_defaults() {
    let config = AppConfig::default();
    let obs = config
        .observability
        .clone()
        .with_service_name(&config.service_name);

    assert_eq!(obs.service_name, "coalesce");
    assert_eq!(obs.log_format, "pretty");
    assert!(!obs.json_logs());
}
