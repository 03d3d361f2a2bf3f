use dune_backdrop::{SceneConfig, Variant};
use std::io::Write;

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_load_from_file_merges_defaults() {
        let path = std::env::temp_dir().join(format!("dune-backdrop-{}.json", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            write!(file, r#"{{ "variant": "crash-proof", "orb_count": 3 }}"#).unwrap();
        }

        let config = SceneConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.variant, Variant::Simple);
        assert_eq!(config.orb_count, 3);
        assert_eq!(config.segments, SceneConfig::for_variant(Variant::Simple).segments);
    }

    #[test]
    fn test_written_preset_loads_back_unchanged() {
        let preset = SceneConfig::for_variant(Variant::Simple);
        let json = serde_json::to_string_pretty(&preset).unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), preset);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let json = r#"{ "orb_floor": 10.0, "orb_ceiling": 5.0 }"#;
        let err = SceneConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("orb_floor"));
    }
}
