//! Resource pipeline configuration
//!
//! Loaded from TOML; every section and key is optional.
//!
//! ```toml
//! [game]
//! path_base = "StarFoxAdventures"
//!
//! [game.subdirs]
//! 7 = "swaphol"
//!
//! [decoder]
//! max_nesting_depth = 8
//!
//! [playback]
//! exhibit_rate = 8.0
//! object_rate = 4.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::formats::container::DEFAULT_MAX_NESTING_DEPTH;

/// Where a game's files live and how location numbers map to subdirectories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameInfo {
    /// Root directory of the game files, relative to the fetcher root.
    pub path_base: String,
    /// Location number to map subdirectory. TOML keys are decimal strings.
    #[serde(
        serialize_with = "serialize_location_keys",
        deserialize_with = "deserialize_location_keys"
    )]
    pub subdirs: BTreeMap<u32, String>,
}

fn serialize_location_keys<S: Serializer>(
    subdirs: &BTreeMap<u32, String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(subdirs.iter().map(|(location, subdir)| (location.to_string(), subdir)))
}

fn deserialize_location_keys<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<u32, String>, D::Error> {
    use serde::de::Error as _;

    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut subdirs = BTreeMap::new();
    for (key, subdir) in raw {
        let location: u32 = key
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("subdir key '{key}' is not a location number")))?;
        if subdirs.insert(location, subdir).is_some() {
            return Err(D::Error::custom(format!("location {location} is mapped twice")));
        }
    }
    Ok(subdirs)
}

impl GameInfo {
    pub fn sfa() -> Self {
        Self {
            path_base: "StarFoxAdventures".to_string(),
            subdirs: BTreeMap::new(),
        }
    }

    pub fn sfa_demo() -> Self {
        Self {
            path_base: "StarFoxAdventuresDemo".to_string(),
            subdirs: BTreeMap::new(),
        }
    }

    /// Path of a file at the game root.
    pub fn root_path(&self, file: &str) -> String {
        format!("{}/{file}", self.path_base)
    }

    /// Path of a file inside a map subdirectory.
    pub fn subdir_path(&self, subdir: &str, file: &str) -> String {
        format!("{}/{subdir}/{file}", self.path_base)
    }
}

impl Default for GameInfo {
    fn default() -> Self {
        Self::sfa()
    }
}

/// Subdirectory for a location number.
///
/// # Errors
/// Returns [`Error::UnknownSubdir`] if `location` is not mapped.
pub fn get_subdir(location: u32, game: &GameInfo) -> Result<&str> {
    game.subdirs
        .get(&location)
        .map(String::as_str)
        .ok_or(Error::UnknownSubdir(location))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Recognized container layers `decode_nested` strips before giving up.
    pub max_nesting_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Keyframes per second for the two playback contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Single-model exhibit.
    pub exhibit_rate: f32,
    /// Objects placed in a map.
    pub object_rate: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            exhibit_rate: 8.0,
            object_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameInfo,
    pub decoder: DecoderConfig,
    pub playback: PlaybackConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.game.path_base.is_empty() {
            return Err(Error::Config {
                message: "game.path_base must not be empty".to_string(),
            });
        }
        for (name, rate) in [
            ("exhibit_rate", self.playback.exhibit_rate),
            ("object_rate", self.playback.object_rate),
        ] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(Error::Config {
                    message: format!("playback.{name} must be a positive number, got {rate}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.game.path_base, "StarFoxAdventures");
        assert_eq!(config.decoder.max_nesting_depth, 8);
        assert_eq!(config.playback.exhibit_rate, 8.0);
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml_str(
            r#"
            [game]
            path_base = "StarFoxAdventuresDemo"

            [game.subdirs]
            7 = "swaphol"

            [playback]
            object_rate = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(get_subdir(7, &config.game).unwrap(), "swaphol");
        assert!(matches!(get_subdir(8, &config.game), Err(Error::UnknownSubdir(8))));
        assert_eq!(config.playback.object_rate, 2.5);
        assert_eq!(config.playback.exhibit_rate, 8.0);
    }

    #[test]
    fn test_rejects_non_numeric_location() {
        let err = Config::from_toml_str("[game.subdirs]\nswaphol = \"swaphol\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_location_keys_are_numeric() {
        let config = Config::from_toml_str("[game.subdirs]\n\"07\" = \"swaphol\"\n\"+12\" = \"dragrock\"\n").unwrap();
        assert_eq!(get_subdir(7, &config.game).unwrap(), "swaphol");
        assert_eq!(get_subdir(12, &config.game).unwrap(), "dragrock");

        let err = Config::from_toml_str("[game.subdirs]\n7 = \"a\"\n\"07\" = \"b\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_subdirs_survive_toml_round_trip() {
        let mut config = Config::default();
        config.game.subdirs.insert(7, "swaphol".to_string());
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_rate() {
        let err = Config::from_toml_str("[playback]\nexhibit_rate = 0.0\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_paths() {
        let game = GameInfo::sfa();
        assert_eq!(game.root_path("AMAP.TAB"), "StarFoxAdventures/AMAP.TAB");
        assert_eq!(game.subdir_path("swaphol", "ANIM.TAB"), "StarFoxAdventures/swaphol/ANIM.TAB");
    }
}
