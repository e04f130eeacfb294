//! Export pipeline facade
//!
//! Translate, assemble, serialize — one synchronous call per export.
//! Re-running with unchanged inputs yields byte-identical output; no state
//! survives between runs besides the caller-held mapping tables.

use crate::mapping::MappingTables;
use crate::scene::{SceneDescription, assemble};
use crate::translate::{OverrideRegistry, Warning};
use crate::Result;

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// The serialized scene document.
    pub xml: String,
    /// Non-fatal notices collected along the way.
    pub warnings: Vec<Warning>,
}

impl std::fmt::Display for ExportResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Exported scene document ({} bytes, {} warnings)",
            self.xml.len(),
            self.warnings.len()
        )
    }
}

/// Run the full pipeline for one scene.
pub fn export_scene(
    scene: &SceneDescription,
    tables: &MappingTables,
    overrides: &OverrideRegistry,
) -> Result<ExportResult> {
    let assembly = assemble(scene, tables, overrides)?;
    let xml = assembly.document.serialize();
    tracing::debug!(
        bytes = xml.len(),
        warnings = assembly.warnings.len(),
        "export complete"
    );
    Ok(ExportResult {
        xml,
        warnings: assembly.warnings,
    })
}
