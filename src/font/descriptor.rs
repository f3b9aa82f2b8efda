//! Font descriptor documents
//!
//! A descriptor names a bitmap font and its atlas layout. Descriptors
//! are TOML documents; imports from a vector source synthesize the same
//! shape before registering, so both entry points share one parse path.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_first_glyph() -> u32 {
    crate::constants::DEFAULT_FIRST_GLYPH
}

fn is_zero_i32(v: &i32) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_default_spacing(v: &[i32; 2]) -> bool {
    *v == [0, 0]
}

/// Named record describing a bitmap font resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct FontDescriptor {
    pub name: String,
    /// Atlas texture path, resolved through the resource store
    pub texture: String,
    /// Rendered glyph height (ascent + descent)
    #[serde(default)]
    pub height: u32,
    /// Tile dimensions: [width, height]
    #[serde(default)]
    pub glyph_size: [u32; 2],
    #[serde(default = "default_first_glyph")]
    pub first_glyph: u32,
    #[serde(default)]
    pub space_width: u32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub y_offset: i32,
    /// Extra [x, y] padding applied around each tile
    #[serde(default, skip_serializing_if = "is_default_spacing")]
    pub spacing: [i32; 2],
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub underline_offset: u32,
    /// Register this font as the registry default
    #[serde(default, skip_serializing_if = "std::ops::Not::not", rename = "default")]
    pub set_default: bool,
    /// Path of the vector source this font was packed from, when known.
    /// Enables the whole-string fallback path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl FontDescriptor {
    /// Parse a TOML descriptor document.
    pub fn parse(text: &str) -> Result<FontDescriptor> {
        let desc: FontDescriptor =
            toml::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;
        if desc.name.is_empty() {
            return Err(Error::Parse("descriptor has an empty name".into()));
        }
        if desc.texture.is_empty() {
            return Err(Error::Parse(format!(
                "descriptor '{}' names no texture",
                desc.name
            )));
        }
        Ok(desc)
    }

    /// Serialize back to a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_applies_defaults() {
        let desc = FontDescriptor::parse(
            r#"
name = "verdana-11px"
texture = "fonts/verdana-11px.png"
height = 14
glyph-size = [16, 16]
"#,
        )
        .unwrap();
        assert_eq!(desc.name, "verdana-11px");
        assert_eq!(desc.first_glyph, 32);
        assert_eq!(desc.y_offset, 0);
        assert_eq!(desc.spacing, [0, 0]);
        assert!(!desc.set_default);
        assert!(desc.source.is_none());
    }

    #[test]
    fn test_parse_full() {
        let desc = FontDescriptor::parse(
            r#"
name = "sans"
texture = "generated/fonts/sans_cp1252.png"
height = 18
glyph-size = [20, 22]
first-glyph = 32
space-width = 5
y-offset = -1
spacing = [1, 0]
underline-offset = 2
default = true
source = "fonts/sans.ttf"
"#,
        )
        .unwrap();
        assert_eq!(desc.glyph_size, [20, 22]);
        assert_eq!(desc.y_offset, -1);
        assert!(desc.set_default);
        assert_eq!(desc.source.as_deref(), Some("fonts/sans.ttf"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(FontDescriptor::parse("not toml at all [").is_err());
        assert!(FontDescriptor::parse(r#"texture = "x.png""#).is_err()); // no name
        assert!(FontDescriptor::parse(r#"name = """#).is_err());
    }

    #[test]
    fn test_synthesized_document_reimports() {
        let desc = FontDescriptor {
            name: "packed".into(),
            texture: "generated/fonts/packed_cp1252.png".into(),
            height: 16,
            glyph_size: [18, 20],
            first_glyph: 32,
            space_width: 4,
            y_offset: 0,
            spacing: [1, 0],
            underline_offset: 2,
            set_default: true,
            source: Some("fonts/packed.ttf".into()),
        };
        let text = desc.to_toml().unwrap();
        assert_eq!(FontDescriptor::parse(&text).unwrap(), desc);
    }
}
