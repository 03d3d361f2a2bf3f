// config.rs - Scene configuration and variant presets
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MOUNT_ID: &str = "dune-backdrop";

/// Keeps 6 * segments^2 mesh indices well inside u32
pub const MAX_SEGMENTS: u32 = 1024;
pub const MAX_ORBS: usize = 1024;
pub const MAX_DUST: usize = 200_000;
pub const MAX_TERRAIN_SIZE: f32 = 10_000.0;
/// Largest magnitude accepted for spawn heights and other world-space values
pub const MAX_WORLD_EXTENT: f32 = 1.0e6;

/// Which flavour of the backdrop to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Layered noise dunes, more orbs, denser dust
    #[serde(alias = "v2")]
    #[value(alias = "v2")]
    Rich,
    /// Closed-form wave dunes, smaller grid, fewer entities
    #[serde(alias = "crash-proof")]
    #[value(alias = "crash-proof")]
    Simple,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Rich => "rich",
            Variant::Simple => "simple",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub variant: Variant,
    pub seed: u64,
    /// Side length of the square terrain in world units
    pub terrain_size: f32,
    /// Grid cells per side; the mesh has (segments + 1)^2 vertices
    pub segments: u32,
    pub dune_amplitude: f32,
    pub orb_count: usize,
    pub dust_count: usize,
    pub orb_floor: f32,
    pub orb_ceiling: f32,
    pub dust_floor: f32,
    pub dust_ceiling: f32,
    /// Virtual page height that the scroll offset travels over, in pixels
    pub scroll_range: f32,
    /// Pixels scrolled per wheel line
    pub scroll_step: f32,
    pub pointer_parallax: f32,
    pub mount_id: String,
    pub skip_on_touch: bool,
    /// Drive time of day from the local clock instead of scrolling
    pub follow_clock: bool,
}

impl SceneConfig {
    pub fn for_variant(variant: Variant) -> Self {
        let base = Self {
            variant,
            seed: 7,
            terrain_size: 120.0,
            segments: 160,
            dune_amplitude: 6.0,
            orb_count: 14,
            dust_count: 1500,
            orb_floor: -4.0,
            orb_ceiling: 30.0,
            dust_floor: -1.0,
            dust_ceiling: 26.0,
            scroll_range: 3000.0,
            scroll_step: 60.0,
            pointer_parallax: 4.0,
            mount_id: DEFAULT_MOUNT_ID.to_string(),
            skip_on_touch: true,
            follow_clock: false,
        };

        match variant {
            Variant::Rich => base,
            Variant::Simple => Self {
                segments: 64,
                dune_amplitude: 4.0,
                orb_count: 8,
                dust_count: 400,
                pointer_parallax: 2.5,
                ..base
            },
        }
    }

    /// Parse a JSON document; fields it leaves out take the defaults of its variant
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_with(json, None)
    }

    /// Like `from_json_str`, but `forced` replaces the document's variant before
    /// its other fields are laid over that variant's defaults
    fn from_json_with(json: &str, forced: Option<Variant>) -> Result<Self> {
        let overrides: serde_json::Value =
            serde_json::from_str(json).context("config is not valid JSON")?;
        let serde_json::Value::Object(mut overrides) = overrides else {
            bail!("config must be a JSON object");
        };

        if let Some(variant) = forced {
            overrides.insert("variant".to_string(), serde_json::to_value(variant)?);
        }

        let variant = match overrides.get("variant") {
            Some(v) => serde_json::from_value(v.clone()).context("unknown variant")?,
            None => Variant::Rich,
        };

        let mut merged = serde_json::to_value(Self::for_variant(variant))?;
        if let serde_json::Value::Object(fields) = &mut merged {
            fields.extend(overrides);
        }

        let config: Self = serde_json::from_value(merged).context("invalid config field")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_variant(path, None)
    }

    /// Load a config file, optionally switching it to another variant's defaults
    /// while keeping every field the file sets
    pub fn load_with_variant(path: &Path, variant: Option<Variant>) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_with(&text, variant)
            .with_context(|| format!("in config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("terrain_size", self.terrain_size),
            ("dune_amplitude", self.dune_amplitude),
            ("orb_floor", self.orb_floor),
            ("orb_ceiling", self.orb_ceiling),
            ("dust_floor", self.dust_floor),
            ("dust_ceiling", self.dust_ceiling),
            ("scroll_range", self.scroll_range),
            ("scroll_step", self.scroll_step),
            ("pointer_parallax", self.pointer_parallax),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                bail!("{} must be finite, got {}", name, value);
            }
            if value.abs() > MAX_WORLD_EXTENT {
                bail!("{} ({}) exceeds {}", name, value, MAX_WORLD_EXTENT);
            }
        }

        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            bail!("segments must be in 1..={}, got {}", MAX_SEGMENTS, self.segments);
        }
        if !(self.terrain_size > 0.0) || self.terrain_size > MAX_TERRAIN_SIZE {
            bail!(
                "terrain_size must be in (0, {}], got {}",
                MAX_TERRAIN_SIZE,
                self.terrain_size
            );
        }
        if !(self.dune_amplitude >= 0.0) {
            bail!("dune_amplitude must not be negative");
        }
        if self.orb_count > MAX_ORBS {
            bail!("orb_count must be at most {}, got {}", MAX_ORBS, self.orb_count);
        }
        if self.dust_count > MAX_DUST {
            bail!("dust_count must be at most {}, got {}", MAX_DUST, self.dust_count);
        }
        if self.orb_floor >= self.orb_ceiling {
            bail!(
                "orb_floor ({}) must be below orb_ceiling ({})",
                self.orb_floor,
                self.orb_ceiling
            );
        }
        if self.dust_floor >= self.dust_ceiling {
            bail!(
                "dust_floor ({}) must be below dust_ceiling ({})",
                self.dust_floor,
                self.dust_ceiling
            );
        }
        if !(self.orb_ceiling - self.orb_floor).is_finite()
            || !(self.dust_ceiling - self.dust_floor).is_finite()
        {
            bail!("floor..ceiling spans must be finite");
        }
        if !(self.scroll_range > 0.0) || !(self.scroll_step > 0.0) {
            bail!("scroll_range and scroll_step must be positive");
        }
        Ok(())
    }

    /// Half-width of the area orbs and dust are scattered over
    pub fn spawn_extent(&self) -> f32 {
        self.terrain_size * 0.4
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Rich)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rich_is_denser_than_simple() {
        let rich = SceneConfig::for_variant(Variant::Rich);
        let simple = SceneConfig::for_variant(Variant::Simple);
        assert!(rich.segments > simple.segments);
        assert!(rich.orb_count > simple.orb_count);
        assert!(rich.dust_count > simple.dust_count);
    }

    #[test]
    fn presets_validate() {
        assert!(SceneConfig::for_variant(Variant::Rich).validate().is_ok());
        assert!(SceneConfig::for_variant(Variant::Simple).validate().is_ok());
    }

    #[test]
    fn json_missing_fields_use_variant_defaults() {
        let config = SceneConfig::from_json_str(r#"{ "variant": "crash-proof", "seed": 99 }"#)
            .unwrap();
        assert_eq!(config.variant, Variant::Simple);
        assert_eq!(config.seed, 99);
        assert_eq!(config.segments, 64);
        assert_eq!(config.mount_id, DEFAULT_MOUNT_ID);
    }

    #[test]
    fn json_v2_alias() {
        let config = SceneConfig::from_json_str(r#"{ "variant": "v2" }"#).unwrap();
        assert_eq!(config.variant, Variant::Rich);
    }

    #[test]
    fn json_empty_object_is_rich() {
        let config = SceneConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn json_rejects_inverted_thresholds() {
        let err = SceneConfig::from_json_str(r#"{ "orb_floor": 40.0 }"#);
        assert!(err.is_err());
    }

    #[test]
    fn json_rejects_non_object() {
        assert!(SceneConfig::from_json_str("[1, 2]").is_err());
        assert!(SceneConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn zero_segments_rejected() {
        let config = SceneConfig {
            segments: 0,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_segments_rejected() {
        let err = SceneConfig::from_json_str(r#"{ "segments": 4000000000 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("segments"));

        let config = SceneConfig {
            segments: MAX_SEGMENTS,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overflowing_floats_rejected() {
        // 1e39 does not fit in f32 and parses as infinity
        let err = SceneConfig::from_json_str(r#"{ "orb_ceiling": 1e39 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("orb_ceiling"));

        let err =
            SceneConfig::from_json_str(r#"{ "terrain_size": 1e39, "segments": 2 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("terrain_size"));
    }

    #[test]
    fn non_finite_fields_rejected() {
        let fields: [fn(&mut SceneConfig); 5] = [
            |c| c.dust_ceiling = f32::INFINITY,
            |c| c.dust_floor = f32::NAN,
            |c| c.dune_amplitude = f32::INFINITY,
            |c| c.pointer_parallax = f32::NAN,
            |c| c.scroll_step = f32::INFINITY,
        ];
        for set in fields {
            let mut config = SceneConfig::default();
            set(&mut config);
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn overflowing_span_rejected() {
        let config = SceneConfig {
            orb_floor: -3.0e38,
            orb_ceiling: 3.0e38,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SceneConfig {
            dust_floor: -MAX_WORLD_EXTENT * 2.0,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_terrain_rejected() {
        let config = SceneConfig {
            terrain_size: MAX_TERRAIN_SIZE * 2.0,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn entity_counts_bounded() {
        let config = SceneConfig {
            orb_count: MAX_ORBS + 1,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SceneConfig {
            dust_count: MAX_DUST + 1,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_err());

        let err = SceneConfig::from_json_str(r#"{ "dust_count": 4000000000 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("dust_count"));
    }

    #[test]
    fn forced_variant_keeps_file_fields() {
        let config = SceneConfig::from_json_with(
            r#"{ "variant": "rich", "mount_id": "hero", "orb_count": 3 }"#,
            Some(Variant::Simple),
        )
        .unwrap();
        assert_eq!(config.variant, Variant::Simple);
        assert_eq!(config.mount_id, "hero");
        assert_eq!(config.orb_count, 3);
        assert_eq!(config.segments, 64);
    }
}
