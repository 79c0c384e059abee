use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_twist_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        for key in [
            "TWIST_PORT",
            "TWIST_BIND_ADDR",
            "TWIST_CORPUS_PATH",
            "TWIST_INDEX_PATH",
            "TWIST_EMBEDDER_PATH",
            "TWIST_LLM_MODEL",
            "TWIST_TOP_K",
            "TWIST_INDEX_KIND",
            "TWIST_REQUEST_TIMEOUT_SECS",
            "TWIST_INFERENCE_WORKERS",
            "TWIST_CACHE_CAPACITY",
            "TWIST_CACHE_TTL_SECS",
            "TWIST_CACHE_PREDICTIONS",
            "TWIST_MODERATION",
            "TWIST_MOCK_PROVIDER",
        ] {
            env::remove_var(key);
        }
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8001);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.corpus_path, PathBuf::from("./data/twists.json"));
    assert!(config.index_path.is_none());
    assert!(config.embedder_path.is_none());
    assert_eq!(config.llm_model, "llama3.2:1b");
    assert_eq!(config.top_k, 3);
    assert_eq!(config.index_kind, IndexKind::Flat);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert!(config.cache_predictions);
    assert!(config.moderation);
    assert!(!config.mock_provider);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8001");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "[::1]:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_twist_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8001);
    assert_eq!(config.top_k, 3);
    assert!(config.inference_workers.is_none());
    assert!(!config.mock_provider);
}

#[test]
#[serial]
fn test_from_env_custom_values() {
    clear_twist_env();

    with_env_vars(
        &[
            ("TWIST_PORT", "9000"),
            ("TWIST_CORPUS_PATH", "/srv/twists.jsonl"),
            ("TWIST_INDEX_PATH", "/srv/index.rkyv"),
            ("TWIST_EMBEDDER_PATH", "/models/all-MiniLM-L6-v2"),
            ("TWIST_LLM_MODEL", "gpt-4o-mini"),
            ("TWIST_TOP_K", "5"),
            ("TWIST_INDEX_KIND", "bq"),
            ("TWIST_REQUEST_TIMEOUT_SECS", "12"),
            ("TWIST_INFERENCE_WORKERS", "2"),
            ("TWIST_CACHE_PREDICTIONS", "false"),
            ("TWIST_MODERATION", "off"),
            ("TWIST_MOCK_PROVIDER", "1"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.port, 9000);
            assert_eq!(config.corpus_path, PathBuf::from("/srv/twists.jsonl"));
            assert_eq!(config.index_path, Some(PathBuf::from("/srv/index.rkyv")));
            assert_eq!(
                config.embedder_path,
                Some(PathBuf::from("/models/all-MiniLM-L6-v2"))
            );
            assert_eq!(config.llm_model, "gpt-4o-mini");
            assert_eq!(config.top_k, 5);
            assert_eq!(config.index_kind, IndexKind::BinaryQuantized);
            assert_eq!(config.request_timeout, Duration::from_secs(12));
            assert_eq!(config.inference_workers, Some(2));
            assert_eq!(config.effective_inference_workers(), 2);
            assert!(!config.cache_predictions);
            assert!(!config.moderation);
            assert!(config.mock_provider);
        },
    );
}

#[test]
#[serial]
fn test_empty_optional_paths_are_none() {
    clear_twist_env();

    with_env_vars(
        &[("TWIST_INDEX_PATH", "  "), ("TWIST_EMBEDDER_PATH", "")],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.index_path.is_none());
            assert!(config.embedder_path.is_none());
        },
    );
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_twist_env();

    with_env_vars(&[("TWIST_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_twist_env();

    with_env_vars(&[("TWIST_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_twist_env();

    with_env_vars(&[("TWIST_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_top_k() {
    clear_twist_env();

    with_env_vars(&[("TWIST_TOP_K", "many")], || {
        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue { name, value, .. } => {
                assert_eq!(name, "TWIST_TOP_K");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    });
}

#[test]
#[serial]
fn test_invalid_index_kind() {
    clear_twist_env();

    with_env_vars(&[("TWIST_INDEX_KIND", "hnsw")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("hnsw"));
    });
}

#[test]
#[serial]
fn test_unrecognised_bool_keeps_default() {
    clear_twist_env();

    with_env_vars(&[("TWIST_MODERATION", "maybe")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.moderation);
    });
}

#[test]
fn test_validate_missing_corpus() {
    let config = Config {
        corpus_path: PathBuf::from("/nonexistent/twists.json"),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_corpus_is_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        corpus_path: dir.path().to_path_buf(),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotAFile { .. }));
}

#[test]
fn test_validate_embedder_must_be_directory() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("twists.json");
    std::fs::write(&corpus, "[]").unwrap();

    let config = Config {
        corpus_path: corpus.clone(),
        embedder_path: Some(corpus.clone()),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_zero_top_k() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("twists.json");
    std::fs::write(&corpus, "[]").unwrap();

    let config = Config {
        corpus_path: corpus,
        top_k: 0,
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_validate_ok() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("twists.json");
    std::fs::write(&corpus, "[]").unwrap();

    let config = Config {
        corpus_path: corpus,
        embedder_path: Some(dir.path().to_path_buf()),
        index_path: Some(dir.path().join("index.rkyv")),
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}
