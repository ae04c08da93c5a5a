use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::decide::PatchOptions;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatcherConfig {
    #[serde(default = "default_patch_file_name")]
    pub patch_file_name: String,
    #[serde(default = "default_true")]
    pub ballistic_weave_only_for_clothes: bool,
    #[serde(default)]
    pub data: DataConfig,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            patch_file_name: default_patch_file_name(),
            ballistic_weave_only_for_clothes: true,
            data: DataConfig::default(),
        }
    }
}

fn default_patch_file_name() -> String {
    "zPatch.esp".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Data paths
// ---------------------------------------------------------------------------

/// Input and output locations. Relative paths are resolved against the
/// directory holding the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    #[serde(default = "default_records")]
    pub records: PathBuf,
    #[serde(default = "default_slot_data")]
    pub slot_data: PathBuf,
    #[serde(default = "default_overrides_dir")]
    pub overrides_dir: PathBuf,
    #[serde(default = "default_guesses")]
    pub guesses: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records: default_records(),
            slot_data: default_slot_data(),
            overrides_dir: default_overrides_dir(),
            guesses: default_guesses(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_records() -> PathBuf {
    "records.json".into()
}

fn default_slot_data() -> PathBuf {
    "slotData.csv".into()
}

fn default_overrides_dir() -> PathBuf {
    "overrides".into()
}

fn default_guesses() -> PathBuf {
    "guesses.csv".into()
}

fn default_output_dir() -> PathBuf {
    ".".into()
}

impl DataConfig {
    /// Same paths, anchored at `base_dir`. Absolute paths are kept as-is.
    pub fn resolve(&self, base_dir: &Path) -> DataConfig {
        DataConfig {
            records: base_dir.join(&self.records),
            slot_data: base_dir.join(&self.slot_data),
            overrides_dir: base_dir.join(&self.overrides_dir),
            guesses: base_dir.join(&self.guesses),
            output_dir: base_dir.join(&self.output_dir),
        }
    }

    fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            ("records", &self.records),
            ("slot_data", &self.slot_data),
            ("overrides_dir", &self.overrides_dir),
            ("guesses", &self.guesses),
            ("output_dir", &self.output_dir),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PatcherConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PatcherConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.patch_file_name.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "patch_file_name must not be empty".into(),
            ));
        }
        if self.patch_file_name.contains(['/', '\\']) {
            return Err(ReconError::ConfigValidation(format!(
                "patch_file_name must be a bare file name, got '{}'",
                self.patch_file_name
            )));
        }

        for (key, path) in self.data.entries() {
            if path.as_os_str().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "data.{key} must not be empty"
                )));
            }
        }

        Ok(())
    }

    pub fn options(&self) -> PatchOptions {
        PatchOptions {
            patch_file_name: self.patch_file_name.clone(),
            ballistic_weave_only_for_clothes: self.ballistic_weave_only_for_clothes,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
