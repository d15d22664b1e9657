//! Environment overrides on top of the YAML configuration files.

use std::fs;

use pitline::infrastructure::config::ConfigLoader;

#[test]
fn test_env_overrides_nested_keys() {
    let dir = tempfile::tempdir().unwrap();

    temp_env::with_vars(
        [
            ("PITLINE_SERVER__PORT", Some("9100")),
            ("PITLINE_CACHE__REDIS_URL", Some("redis://cache.internal:6379")),
            ("PITLINE_AUTH__SECRET_KEY", Some("a-much-longer-production-secret")),
        ],
        || {
            let config = ConfigLoader::load_from_dir(dir.path(), None).unwrap();
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.cache.redis_url.as_deref(), Some("redis://cache.internal:6379"));
            assert_eq!(config.auth.secret_key, "a-much-longer-production-secret");
            assert_eq!(config.server.api_prefix, "/api/v1");
        },
    );
}

#[test]
fn test_env_beats_yaml_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.yaml"), "server:\n  port: 8100\ndatabase:\n  path: race.db\n").unwrap();
    fs::write(dir.path().join("local.yaml"), "server:\n  port: 8200\n").unwrap();

    temp_env::with_var("PITLINE_SERVER__PORT", Some("8300"), || {
        let config = ConfigLoader::load_from_dir(dir.path(), None).unwrap();
        assert_eq!(config.server.port, 8300);
        assert_eq!(config.database.path, "race.db");
    });

    temp_env::with_var_unset("PITLINE_SERVER__PORT", || {
        let config = ConfigLoader::load_from_dir(dir.path(), None).unwrap();
        assert_eq!(config.server.port, 8200);
    });
}

#[test]
fn test_invalid_env_value_fails_validation() {
    let dir = tempfile::tempdir().unwrap();

    temp_env::with_var("PITLINE_LOGGING__LEVEL", Some("verbose"), || {
        let err = ConfigLoader::load_from_dir(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    });

    temp_env::with_var("PITLINE_AUTH__SECRET_KEY", Some("short"), || {
        assert!(ConfigLoader::load_from_dir(dir.path(), None).is_err());
    });
}

#[test]
fn test_unparseable_env_value_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    temp_env::with_var("PITLINE_SERVER__PORT", Some("not-a-port"), || {
        assert!(ConfigLoader::load_from_dir(dir.path(), None).is_err());
    });
}
