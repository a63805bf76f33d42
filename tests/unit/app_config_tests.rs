/*!
 * Tests for configuration loading and validation
 */

use crossverse::app_config::{AlignmentConfig, Config, LogLevel};

/// Test the documented defaults
#[test]
fn test_config_defaults_shouldMatchDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.alignment.jaccard_threshold, 0.70);
    assert_eq!(config.alignment.levenshtein_threshold, 0.15);
    assert_eq!(config.alignment.neighbor_window, 2);
    assert!(config.alignment.reference_translation.is_none());
    assert!(config.build_timeout_secs.is_none());
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test loading a config file with partial content
#[test]
fn test_config_fromFile_withPartialJson_shouldFillDefaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "alignment": {
                "jaccard_threshold": 0.85,
                "reference_translation": "kjv"
            },
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.alignment.jaccard_threshold, 0.85);
    assert_eq!(config.alignment.reference_translation.as_deref(), Some("kjv"));
    assert_eq!(config.alignment.levenshtein_threshold, 0.15);
    assert_eq!(config.alignment.neighbor_window, 2);
    assert_eq!(config.log_level, LogLevel::Debug);
}

/// Test that loading rejects out-of-range thresholds
#[test]
fn test_config_fromFile_withBadThreshold_shouldFail() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{ "alignment": { "jaccard_threshold": 2.0 } }"#).unwrap();

    assert!(Config::from_file(&path).is_err());
}

/// Test that loading a missing file fails with context
#[test]
fn test_config_fromFile_withMissingFile_shouldFail() {
    assert!(Config::from_file("definitely/not/here.json").is_err());
}

/// Test alignment config validation bounds
#[test]
fn test_alignment_config_validate_shouldEnforceRanges() {
    let mut config = AlignmentConfig::default();
    assert!(config.validate().is_ok());

    config.jaccard_threshold = -0.01;
    assert!(config.validate().is_err());

    config.jaccard_threshold = 0.5;
    config.levenshtein_threshold = 1.5;
    assert!(config.validate().is_err());
}

/// Test config serialization round trip
#[test]
fn test_config_roundTrip_shouldPreserveValues() {
    let mut config = Config::default();
    config.alignment.neighbor_window = 3;
    config.build_timeout_secs = Some(60);

    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.alignment.neighbor_window, 3);
    assert_eq!(parsed.build_timeout_secs, Some(60));
}
