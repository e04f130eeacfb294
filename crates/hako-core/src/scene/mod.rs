//! Host-facing scene description
//!
//! These structures describe what the host extracted from its scene graph:
//! camera, render settings, mesh references (the geometry itself lives in
//! external files), lights, and per-material shader graphs. They arrive
//! pre-validated and are copied verbatim into the document; only the
//! material graphs go through the translation engine.

mod assemble;

pub use assemble::{Assembly, FALLBACK_MATERIAL_ID, assemble};

use crate::graph::ShaderGraph;
use crate::{Error, Result};
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

/// Render settings forwarded verbatim into the document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel.
    pub sample_count: u32,
    /// Integrator type attribute (`path`, `normals`, ...).
    pub integrator: String,
    /// Reconstruction filter type attribute.
    pub rfilter: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            sample_count: 64,
            integrator: "path".to_string(),
            rfilter: "gaussian".to_string(),
        }
    }
}

/// Perspective camera specification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub origin: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            fov: 45.0,
            origin: Vec3::new(0.0, 1.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// A mesh reference: geometry in an external OBJ file plus an optional
/// material assignment by name.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshRef {
    pub name: String,
    pub filename: String,
    #[serde(default)]
    pub material: Option<String>,
}

/// Scene lights. A small closed set — the target's light model is not
/// graph-based, so these never touch the node-mapping path.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Light {
    Point { position: Vec3, power: [f32; 3] },
    /// An area emitter attached to a named mesh.
    Area { mesh: String, radiance: [f32; 3] },
}

/// A named material with its shader graph.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDescription {
    pub name: String,
    pub graph: ShaderGraph,
}

/// Everything the host hands over for one export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: CameraSpec,
    pub settings: RenderSettings,
    pub meshes: Vec<MeshRef>,
    pub lights: Vec<Light>,
    pub materials: Vec<MaterialDescription>,
}

impl SceneDescription {
    /// Parse a scene description from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Configuration(format!("scene description: {e}")))
    }

    /// Load a scene description from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
