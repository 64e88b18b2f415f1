//! Host-supplied configuration.

use crate::error::{EaselError, EaselResult};
use crate::style::Color;
use crate::tools::ToolKind;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Construction options. Every field is optional when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaselOptions {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Colour of a cleared surface, and what the eraser paints.
    #[serde(alias = "backgroundColor")]
    pub background_color: Color,
    /// Name of the tool selected at start.
    pub tool: String,
}

impl Default for EaselOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: Color::WHITE,
            tool: ToolKind::Pencil.name().to_string(),
        }
    }
}

impl EaselOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_tool(mut self, tool: ToolKind) -> Self {
        self.tool = tool.name().to_string();
        self
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Check the options, returning the initial tool.
    pub fn validate(&self) -> EaselResult<ToolKind> {
        if self.width == 0 || self.height == 0 {
            return Err(EaselError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.tool
            .parse()
            .map_err(|_| EaselError::UnknownTool(self.tool.clone()))
    }
}
