//! Engine configuration
//!
//! Loaded from JSON; every field has a default.
//!
//! ```json
//! {"buffer_size": {"columns": 120, "rows": 0}, "box_style": "double"}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{box_styles, BoxChars, GridDimensions};
use crate::error::Result;

/// Glyph set used for rectangles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStyle {
    #[default]
    Classic,
    Single,
    Double,
    Ascii,
}

impl BoxStyle {
    /// Get box characters for this style
    pub fn chars(&self) -> &'static BoxChars {
        match self {
            BoxStyle::Classic => &box_styles::CLASSIC,
            BoxStyle::Single => &box_styles::SINGLE,
            BoxStyle::Double => &box_styles::DOUBLE,
            BoxStyle::Ascii => &box_styles::ASCII,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Surface size override; a zero axis uses the window size
    pub buffer_size: GridDimensions,
    /// Rectangle glyph set
    pub box_style: BoxStyle,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
