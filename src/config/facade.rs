//! Loader facade: assembles the layered sources into a `PulseConfig`.

use std::path::Path;

use config::{ConfigError, File};
use tracing::debug;

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::PulseConfig;

/// Entry point for loading configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`, lowest precedence first: defaults, global
    /// file, `buildpulse.toml`, `config/{BUILDPULSE_ENV}.toml`, `BUILDPULSE__*` variables.
    pub fn load(workspace_root: &Path) -> Result<PulseConfig, ConfigError> {
        let global = global_file::global_config_path();
        Self::load_layers(workspace_root, global.as_deref())
    }

    /// Load with an explicit global file instead of the per-user default.
    pub fn load_layers(
        workspace_root: &Path,
        global: Option<&Path>,
    ) -> Result<PulseConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        let config: PulseConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            publishers = config.publishers.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single file on top of the defaults. The file must exist.
    pub fn load_from_file(path: &Path) -> Result<PulseConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()
            .and_then(|config| config.try_deserialize())
    }
}
