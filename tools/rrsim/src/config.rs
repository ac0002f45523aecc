//! Run configuration layering.
//!
//! Values are resolved in this order, later layers winning:
//!
//! 1. built-in defaults
//! 2. the job file header
//! 3. the `[sim]` table of a `--config` TOML file
//! 4. command-line flags

use std::path::Path;

use kernel::SimConfig;
use serde::{Deserialize, Serialize};

use crate::cli::SimArgs;
use crate::error::RrsimError;

/// Contents of a `--config` file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub sim: SimOverrides,
}

/// Optional replacements for the job's run scalars.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimOverrides {
    pub memory_size: Option<usize>,
    pub context_switch: Option<u64>,
    pub slice_budget: Option<u64>,
}

impl SimOverrides {
    /// Replace every field of `config` that this layer sets.
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(v) = self.memory_size {
            config.memory_size = v;
        }
        if let Some(v) = self.context_switch {
            config.context_switch = v;
        }
        if let Some(v) = self.slice_budget {
            config.slice_budget = v;
        }
    }
}

impl From<&SimArgs> for SimOverrides {
    fn from(args: &SimArgs) -> Self {
        SimOverrides {
            memory_size: args.memory_size,
            context_switch: args.context_switch,
            slice_budget: args.slice_budget,
        }
    }
}

/// Parse a config file from a TOML string.
pub fn parse_config_str(content: &str) -> Result<ConfigFile, RrsimError> {
    toml::from_str(content).map_err(|e| RrsimError::ConfigParse(format!("invalid TOML: {e}")))
}

/// Parse a config file from disk.
pub fn load_config(path: &Path) -> Result<ConfigFile, RrsimError> {
    let content = std::fs::read_to_string(path).map_err(|source| RrsimError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&content)
}

/// Layer the config file and flags over the job header.
pub fn resolve(header: SimConfig, args: &SimArgs) -> Result<SimConfig, RrsimError> {
    let mut config = header;
    if let Some(path) = &args.config {
        let file = load_config(path)?;
        file.sim.apply(&mut config);
        log::debug!("applied config file {}", path.display());
    }
    SimOverrides::from(args).apply(&mut config);
    config.validate()?;
    Ok(config)
}
