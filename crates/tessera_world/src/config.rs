//! # World Configuration
//!
//! TOML description of the object types and light settings of a world.
//!
//! ```toml
//! [light]
//! max_radius = 15
//!
//! [[object]]
//! id = 40
//! transparent = false
//! blocking = true
//! has_txt = true
//! active = false
//! uv = [0.0, 0.25, 0.0625, 0.3125]
//!
//! [[object]]
//! id = 90
//! model_dim = 2
//! model_blocks = [1, 1, 1, 1, 0, 0, 0, 0]
//! ```

use serde::{Deserialize, Serialize};

use crate::attr::{ObjectProps, ObjectTable, UvRect};
use crate::error::{WorldError, WorldResult};
use crate::light::LightConfig;

/// One `[[object]]` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeConfig {
    /// Type id.
    pub id: u32,
    /// Lets light through.
    #[serde(default)]
    pub transparent: bool,
    /// Collides with entities.
    #[serde(default)]
    pub blocking: bool,
    /// Has a textured face.
    #[serde(default)]
    pub has_txt: bool,
    /// Backed by an external entity.
    #[serde(default)]
    pub active: bool,
    /// Texture rectangle.
    #[serde(default)]
    pub uv: UvRect,
    /// Model edge length, if the type is a voxel model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_dim: Option<u32>,
    /// `model_dim³` sub-block ids.
    #[serde(default)]
    pub model_blocks: Vec<u16>,
}

impl ObjectTypeConfig {
    /// The basic properties of this entry.
    #[must_use]
    pub const fn props(&self) -> ObjectProps {
        ObjectProps {
            transparent: self.transparent,
            blocking: self.blocking,
            has_txt: self.has_txt,
            active: self.active,
            uv: self.uv,
        }
    }
}

/// Whole-world configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Light engine settings.
    #[serde(default)]
    pub light: LightConfig,
    /// Object type table entries.
    #[serde(default, rename = "object")]
    pub objects: Vec<ObjectTypeConfig>,
}

impl WorldConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid TOML, does not match the schema,
    /// or sets a light radius above the light range.
    pub fn from_toml_str(text: &str) -> WorldResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| WorldError::InvalidConfig(e.to_string()))?;
        config.light.validate()?;
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml_string(&self) -> WorldResult<String> {
        toml::to_string(self).map_err(|e| WorldError::InvalidConfig(e.to_string()))
    }
}

impl ObjectTable {
    /// Builds a table from configuration entries.
    ///
    /// Entries are applied in order, so a later entry for the same id wins.
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry's error.
    pub fn from_config(config: &WorldConfig) -> WorldResult<Self> {
        let mut table = Self::new();
        for object in &config.objects {
            table.set_object_type(object.id, object.props())?;
            if let Some(dim) = object.model_dim {
                table.set_object_model(object.id, dim, &object.model_blocks)?;
            }
        }
        tracing::debug!(objects = config.objects.len(), "object table configured");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [light]
        max_radius = 12

        [[object]]
        id = 40
        blocking = true
        has_txt = true
        uv = [0.0, 0.25, 0.0625, 0.3125]

        [[object]]
        id = 7
        transparent = true
        active = true

        [[object]]
        id = 90
        blocking = true
        model_dim = 2
        model_blocks = [1, 1, 1, 1, 0, 0, 0, 0]
    "#;

    #[test]
    fn test_parse_sample() {
        let config = WorldConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.light.max_radius, 12);
        assert_eq!(config.objects.len(), 3);
        assert_eq!(config.objects[0].uv, [0.0, 0.25, 0.0625, 0.3125]);
        assert!(!config.objects[0].transparent, "missing flags default to false");
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config.light, LightConfig::default());
        assert!(config.objects.is_empty());
    }

    #[test]
    fn test_table_from_config() {
        let config = WorldConfig::from_toml_str(SAMPLE).unwrap();
        let table = ObjectTable::from_config(&config).unwrap();
        assert!(!table.get(40).transparent);
        assert!(table.get(40).blocking);
        assert!(table.is_active(7));
        assert!(table.get(7).transparent);
        assert_eq!(table.get(90).model_block(1, 1, 1), Some(0));
        assert_eq!(table.get(90).model_block(1, 0, 1), Some(1));
    }

    #[test]
    fn test_invalid_entries() {
        assert!(matches!(
            WorldConfig::from_toml_str("[light]\nmax_radius = \"far\""),
            Err(WorldError::InvalidConfig(_))
        ));

        let config = WorldConfig::from_toml_str("[[object]]\nid = 5000").unwrap();
        assert!(matches!(
            ObjectTable::from_config(&config),
            Err(WorldError::TypeOutOfRange { type_id: 5000, .. })
        ));
    }

    #[test]
    fn test_light_radius_out_of_range() {
        let err = WorldConfig::from_toml_str("[light]\nmax_radius = 255").unwrap_err();
        assert!(matches!(err, WorldError::InvalidConfig(_)));
        assert!(WorldConfig::from_toml_str("[light]\nmax_radius = 15").is_ok());
    }

    #[test]
    fn test_round_trip_text() {
        let config = WorldConfig::from_toml_str(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(WorldConfig::from_toml_str(&text).unwrap(), config);
    }
}
