use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::data::model::{default_modules, ModuleId};
use crate::error::ConfigError;

const MIN_CANVAS: u32 = 100;

/// Run settings. Every field may be omitted from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default = "GeneratorConfig::default_num_layers")]
    pub num_layers: usize,
    #[serde(default = "default_modules")]
    pub modules: Vec<ModuleId>,
    #[serde(default = "GeneratorConfig::default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "GeneratorConfig::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "GeneratorConfig::default_width")]
    pub width: u32,
    #[serde(default = "GeneratorConfig::default_height")]
    pub height: u32,
}

impl GeneratorConfig {
    fn default_num_layers() -> usize {
        28
    }
    fn default_input_dir() -> PathBuf {
        Path::new("EigenVectors data").join("downloaded_csvs")
    }
    fn default_output_dir() -> PathBuf {
        PathBuf::from("heatmaps_merged")
    }
    // 20×18 in at 100 dpi.
    fn default_width() -> u32 {
        2000
    }
    fn default_height() -> u32 {
        1800
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_layers: Self::default_num_layers(),
            modules: default_modules(),
            input_dir: Self::default_input_dir(),
            output_dir: Self::default_output_dir(),
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

impl GeneratorConfig {
    /// Defaults, then the `--config` file if given, then individual flags.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(n) = args.num_layers {
            self.num_layers = n;
        }
        if let Some(modules) = &args.modules {
            self.modules = modules.iter().map(|m| ModuleId::new(m.trim())).collect();
        }
        if let Some(dir) = &args.input_dir {
            self.input_dir = dir.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(w) = args.width {
            self.width = w;
        }
        if let Some(h) = args.height {
            self.height = h;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modules.is_empty() {
            return Err(ConfigError::NoModules);
        }
        for (i, module) in self.modules.iter().enumerate() {
            let id = module.as_str();
            if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') {
                return Err(ConfigError::InvalidModuleId(id.to_string()));
            }
            if self.modules[..i].contains(module) {
                return Err(ConfigError::DuplicateModule(id.to_string()));
            }
        }
        if self.width < MIN_CANVAS || self.height < MIN_CANVAS {
            return Err(ConfigError::CanvasTooSmall {
                width: self.width,
                height: self.height,
                min: MIN_CANVAS,
            });
        }
        Ok(())
    }
}
