//! External-interface JSON schemas: application metadata, window setup, and
//! the pipeline-definition file format consumed when building a subrenderer.
//!
//! The field sets these structs mirror are spec.md §6's External Interfaces
//! JSON shapes. The `serde`-derived, `#[serde(default)]`-filled parse style
//! follows `examples/panxinmiao-myth/src/renderer/shader_generator.rs`'s
//! `ShaderContext::defines` map (a `serde_json`-backed key/value config blob
//! read the same way `PipelineDefinition::defines` is here) and that same
//! crate's glTF loader structs for the derive-and-parse pattern, rather than
//! a hand-rolled parser.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub name: String,
    pub version: Version,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    pub resolution: Resolution,
    pub is_fullscreen: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DepthMode {
    #[default]
    Disabled,
    ReadWrite,
    ReadOnly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrontFace {
    #[default]
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RasterizationState {
    #[serde(default)]
    pub polygon_mode: PolygonMode,
    #[serde(default)]
    pub cull_mode: CullMode,
    #[serde(default)]
    pub front_face: FrontFace,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

fn default_line_width() -> f32 {
    1.0
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::default(),
            cull_mode: CullMode::default(),
            front_face: FrontFace::default(),
            line_width: default_line_width(),
        }
    }
}

/// A pipeline's declarative definition, loaded from its `.json` file
/// alongside its compiled shader stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineDefinition {
    #[serde(default)]
    pub depth: DepthMode,
    #[serde(default)]
    pub uses_transparency: bool,
    #[serde(default)]
    pub rasterization_state: RasterizationState,
    #[serde(default)]
    pub defines: std::collections::BTreeMap<String, String>,
}

pub fn parse_app_config(json: &str) -> serde_json::Result<AppConfig> {
    serde_json::from_str(json)
}

pub fn parse_window_config(json: &str) -> serde_json::Result<WindowConfig> {
    serde_json::from_str(json)
}

pub fn parse_pipeline_definition(json: &str) -> serde_json::Result<PipelineDefinition> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_round_trips_through_json() {
        let json = r#"{"name": "ember-demo", "version": {"major": 0, "minor": 1, "patch": 0}}"#;
        let config = parse_app_config(json).unwrap();
        assert_eq!(config.name, "ember-demo");
        assert_eq!(config.version, Version { major: 0, minor: 1, patch: 0 });
    }

    #[test]
    fn window_config_parses_fullscreen_flag() {
        let json = r#"{"resolution": {"width": 2560, "height": 1440}, "is_fullscreen": true}"#;
        let config = parse_window_config(json).unwrap();
        assert!(config.is_fullscreen);
        assert_eq!(config.resolution, Resolution { width: 2560, height: 1440 });
    }

    #[test]
    fn pipeline_definition_fills_in_defaults_for_omitted_fields() {
        let json = r#"{"uses_transparency": true}"#;
        let def = parse_pipeline_definition(json).unwrap();
        assert_eq!(def.depth, DepthMode::Disabled);
        assert!(def.uses_transparency);
        assert_eq!(def.rasterization_state.cull_mode, CullMode::Back);
        assert_eq!(def.rasterization_state.line_width, 1.0);
        assert!(def.defines.is_empty());
    }

    #[test]
    fn pipeline_definition_reads_explicit_rasterization_state_and_defines() {
        let json = r#"{
            "depth": "read_write",
            "rasterization_state": {"polygon_mode": "line", "cull_mode": "none", "front_face": "counter_clockwise", "line_width": 2.5},
            "defines": {"MAX_LIGHTS": "16"}
        }"#;
        let def = parse_pipeline_definition(json).unwrap();
        assert_eq!(def.depth, DepthMode::ReadWrite);
        assert_eq!(def.rasterization_state.polygon_mode, PolygonMode::Line);
        assert_eq!(def.rasterization_state.front_face, FrontFace::CounterClockwise);
        assert_eq!(def.defines.get("MAX_LIGHTS").map(String::as_str), Some("16"));
    }
}
