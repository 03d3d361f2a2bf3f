// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::{SceneConfig, Variant};

#[derive(Parser, Debug, Clone)]
#[command(name = "dune-backdrop")]
#[command(about = "Looping 3D dune backdrop with drifting orbs and time-of-day lighting", long_about = None)]
pub struct Cli {
    /// Visual variant (rich/v2 or simple/crash-proof)
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Seed for orb and dust placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON scene config; flags given here override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable the FPS overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Treat this device as touch-primary
    #[arg(long)]
    pub touch: bool,

    /// Follow the local clock instead of scrolling for time of day
    #[arg(long)]
    pub clock: bool,

    /// Mount point id to attach to
    #[arg(long, value_name = "ID")]
    pub mount_id: Option<String>,
}

impl Cli {
    /// Resolve the scene config: file (or variant defaults), then flag overrides
    pub fn scene_config(&self) -> Result<SceneConfig> {
        // A variant flag on top of a file re-bases the file's fields on that variant
        let mut config = match &self.config {
            Some(path) => SceneConfig::load_with_variant(path, self.variant)?,
            None => SceneConfig::for_variant(self.variant.unwrap_or(Variant::Rich)),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(id) = &self.mount_id {
            config.mount_id = id.clone();
        }
        if self.clock {
            config.follow_clock = true;
        }

        config.validate()?;
        Ok(config)
    }
}
