//! # Hako Core
//!
//! Converts an in-memory scene description (meshes, node-based material
//! graphs, lights, camera, render settings) into the XML scene document
//! consumed by an offline renderer.
//!
//! The heart of the crate is a data-driven translation engine: node types
//! and parameter names are mapped onto the target schema through external
//! [`mapping::MappingTables`], with a registry of hand-coded
//! [`translate::OverrideRegistry`] overrides for the few conversions that
//! are not one-to-one (roughness squaring, lobe suppression, radiance
//! synthesis).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hako_core::prelude::*;
//!
//! let tables = MappingTables::builtin();
//! let overrides = OverrideRegistry::builtin();
//! let scene = SceneDescription::from_path("scene.json".as_ref())?;
//!
//! let result = export_scene(&scene, &tables, &overrides)?;
//! std::fs::write("scene.xml", &result.xml)?;
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```
//!
//! ## Conventions
//!
//! - Node graphs are uniform data records; no per-type code paths outside
//!   the tables and the override registry.
//! - Absence from a mapping table is a skip signal, never a guess: the
//!   offending node or parameter is omitted with a warning.
//! - A single export pass is synchronous, deterministic, and idempotent.

pub mod document;
pub mod export;
pub mod graph;
pub mod mapping;
pub mod scene;
pub mod translate;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Mapping configuration
    pub use crate::mapping::MappingTables;

    // Shader graphs
    pub use crate::graph::{Param, ParamValue, ShaderGraph, ShaderNode};

    // Translation
    pub use crate::translate::{OverrideRegistry, Translation, Translator, Warning};

    // Target documents
    pub use crate::document::{ParamEntry, SceneDocument, TargetElement};

    // Scene assembly and export
    pub use crate::export::{ExportResult, export_scene};
    pub use crate::scene::{
        Assembly, CameraSpec, Light, MaterialDescription, MeshRef, RenderSettings,
        SceneDescription, assemble,
    };

    // Math (re-export glam)
    pub use glam::Vec3;

    // Error handling
    pub use crate::{Error, Result};
}
