//! Registry of tool instances and the settings broadcast.

use super::{Tool, ToolKind};
use crate::settings::{Setting, SettingsOverride, ToolSettings};
use crate::style::Color;
use std::collections::HashMap;

/// Every tool, alive for the coordinator's lifetime so settings survive
/// tool switches.
#[derive(Debug, Clone)]
pub struct ToolBox {
    tools: HashMap<ToolKind, Tool>,
    /// Every change broadcast so far, latest value per attribute.
    shared: SettingsOverride,
}

impl ToolBox {
    /// Register all tools. `background` is what the eraser paints with.
    pub fn new(background: Color) -> Self {
        let defaults = SettingsOverride::default();
        let tools = ToolKind::ALL
            .into_iter()
            .map(|kind| (kind, Tool::for_kind(kind, background, &defaults)))
            .collect();
        Self {
            tools,
            shared: SettingsOverride::default(),
        }
    }

    pub fn get(&self, kind: ToolKind) -> Option<&Tool> {
        self.tools.get(&kind)
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> Option<&mut Tool> {
        self.tools.get_mut(&kind)
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// Apply `setting` to every tool that has settings.
    pub fn broadcast(&mut self, setting: Setting) {
        for tool in self.tools.values_mut() {
            if let Some(settings) = tool.settings_mut() {
                settings.apply(setting);
            }
        }
        self.shared.set(setting);
    }

    /// All changes broadcast so far.
    pub fn shared(&self) -> &SettingsOverride {
        &self.shared
    }

    /// Snapshot of one tool's settings.
    pub fn settings(&self, kind: ToolKind) -> Option<ToolSettings> {
        self.get(kind).and_then(Tool::settings).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToolKind, &Tool)> {
        self.tools.iter().map(|(kind, tool)| (*kind, tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_registered() {
        let toolbox = ToolBox::new(Color::WHITE);
        for kind in ToolKind::ALL {
            assert!(toolbox.contains(kind));
        }
    }

    #[test]
    fn test_broadcast_reaches_every_tool() {
        let mut toolbox = ToolBox::new(Color::WHITE);
        let green = Color::rgb(0, 200, 0);
        toolbox.broadcast(Setting::StrokeColor(green));

        for (kind, tool) in toolbox.iter() {
            match tool.settings() {
                Some(settings) => assert_eq!(settings.stroke_color, green, "{kind}"),
                None => assert_eq!(kind, ToolKind::Move),
            }
        }
        assert_eq!(toolbox.shared().stroke_color, Some(green));
    }

    #[test]
    fn test_broadcast_keeps_per_tool_defaults() {
        let mut toolbox = ToolBox::new(Color::WHITE);
        toolbox.broadcast(Setting::LineWidth(6.0));
        let rect = toolbox.settings(ToolKind::Rectangle).unwrap();
        let picker = toolbox.settings(ToolKind::ColorPicker).unwrap();
        assert!((rect.line_width - 6.0).abs() < f64::EPSILON);
        assert_eq!(rect.line_cap, crate::style::LineCap::Butt);
        assert!(!picker.send_updates);
    }

    #[test]
    fn test_move_has_no_snapshot() {
        let toolbox = ToolBox::new(Color::WHITE);
        assert!(toolbox.settings(ToolKind::Move).is_none());
    }
}
