//! 설정 파일 로드 통합 테스트.

use ranker_core::{AppConfig, Period, RankerError};
use std::path::PathBuf;

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "ranker-core-{}-{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_shipped_default_config() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
    let config = AppConfig::load(&path).unwrap();

    assert_eq!(config.ranking.max_concurrency, 5);
    assert_eq!(config.ranking.default_period, Period::OneYear);
    assert_eq!(config.data.cache_ttl_secs, 3600);
    assert!((config.scoring.weights.sum() - 1.0).abs() < 1e-9);
}

#[test]
fn test_load_partial_file() {
    let path = write_config(
        "partial",
        r#"
[ranking]
default_period = "6mo"
"#,
    );
    let config = AppConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.ranking.default_period, Period::SixMonths);
    assert_eq!(config.ranking.max_concurrency, 5);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_weights_fail_fast() {
    let path = write_config(
        "bad-weights",
        r#"
[scoring.weights]
total_return = 0.50
volatility = 0.20
sharpe = 0.20
trend = 0.15
momentum = 0.15
"#,
    );
    let result = AppConfig::load(&path);
    std::fs::remove_file(&path).ok();

    match result {
        Err(err @ RankerError::Config(_)) => assert!(err.is_setup_error()),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_error() {
    let path = std::env::temp_dir().join("ranker-core-does-not-exist.toml");
    assert!(AppConfig::load(&path).is_err());
}
