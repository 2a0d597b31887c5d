//! Layered configuration loading feeding a publish pipeline.

use std::path::Path;

use buildpulse::config::{ConfigLoader, PulseConfig, WORKSPACE_CONFIG_FILE};
use buildpulse::publisher::{
    BackendConfiguration, PublishPipeline, PublisherConfiguration, PublisherKind,
};
use tempfile::TempDir;

use super::test_utils::ENV_MUTEX;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Run `f` with `XDG_CONFIG_HOME` pointed at `dir`, restoring the previous value afterwards.
fn with_config_home<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir);
    let result = f();
    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    result
}

#[test]
fn workspace_file_overrides_global_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    write(
        &home.path().join("buildpulse").join("config.toml"),
        r#"
publish_on_new_thread = true

[metrics]
environment_metrics = false

[logging]
level = "debug"
format = "json"
"#,
    );
    write(
        &workspace.path().join(WORKSPACE_CONFIG_FILE),
        r#"
[[publishers]]
type = "hybrid"

[publishers.build_publisher]
type = "influxdb"
url = "http://localhost:8086"
db_name = "tracking"

[publishers.task_publisher]
type = "pushgateway"
url = "http://localhost:9091"
task_job_name = "tracking"

[[publishers]]
type = "output"
order = "desc"

[logging]
level = "warn"
"#,
    );

    let config = with_config_home(home.path(), || ConfigLoader::load(workspace.path())).unwrap();

    assert!(config.publish_on_new_thread);
    assert!(!config.metrics.environment_metrics);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, "json");
    assert!(config.validate().is_ok());

    assert_eq!(config.publishers.len(), 2);
    match &config.publishers[0] {
        PublisherConfiguration::Hybrid(hybrid) => {
            assert!(matches!(
                hybrid.build_publisher,
                Some(BackendConfiguration::InfluxDb(_))
            ));
            match &hybrid.task_publisher {
                Some(BackendConfiguration::PushGateway(gateway)) => {
                    assert_eq!(gateway.task_job_name, "tracking");
                    assert_eq!(gateway.build_job_name, "build");
                }
                other => panic!("unexpected task publisher {other:?}"),
            }
        }
        other => panic!("unexpected publisher {other:?}"),
    }

    let pipeline = PublishPipeline::from_config(&config);
    let kinds: Vec<PublisherKind> = pipeline.publishers().iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec![PublisherKind::Hybrid, PublisherKind::Output]);
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_config_home(home.path(), || ConfigLoader::load(workspace.path())).unwrap();
    assert_eq!(config, PulseConfig::default());
    assert!(PublishPipeline::from_config(&config).publishers().is_empty());
}

#[test]
fn unsupported_hybrid_side_loads_but_fails_validation() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join(WORKSPACE_CONFIG_FILE),
        r#"
[[publishers]]
type = "hybrid"

[publishers.build_publisher]
type = "output"
"#,
    );

    let config = with_config_home(home.path(), || ConfigLoader::load(workspace.path())).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("HybridPublisher"));
}

#[test]
fn unknown_publisher_type_is_a_load_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join(WORKSPACE_CONFIG_FILE),
        r#"
[[publishers]]
type = "carrier_pigeon"
"#,
    );

    let result = with_config_home(home.path(), || ConfigLoader::load(workspace.path()));
    assert!(result.is_err());
}
