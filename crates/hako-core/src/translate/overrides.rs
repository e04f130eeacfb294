//! Special-case resolver: named overrides for non-linear conversions
//!
//! Most nodes translate through pure table lookup. A handful need more:
//! derived values (roughness squared into alpha), suppressed channels
//! (glossy diffuse lobe forced dark), or synthesized parameters with no
//! source-side counterpart (radiance from strength times color). Those
//! live here as an explicit registry keyed by node type — at most one
//! override per type, checked at registration.
//!
//! Overrides are pure functions of the node and its already-resolved table
//! lookups. They never traverse the graph and never perform IO.

use crate::document::{ParamEntry, format_color, format_scalar};
use crate::graph::ShaderNode;
use crate::{Error, Result};
use std::collections::HashMap;

/// Table lookups already resolved for the node an override runs on.
#[derive(Debug, Clone, Copy)]
pub struct NodeLookup<'a> {
    /// Target element tag from `node_tag_map`.
    pub tag: &'a str,
    /// Target type attribute from `node_map`, when mapped.
    pub target_type: Option<&'a str>,
}

/// An override's verdict on a node's parameter set.
#[derive(Debug, Clone, Default)]
pub struct ParamPlan {
    /// Synthesized or derived entries, appended after any table-mapped
    /// parameters, in the order declared here.
    pub emit: Vec<ParamEntry>,
    /// Source parameter names dropped entirely, literal and linked alike.
    pub suppress: Vec<String>,
    /// Whether parameters not suppressed still resolve through the tables.
    /// `false` means `emit` replaces the full literal parameter list.
    pub table_fallthrough: bool,
}

impl ParamPlan {
    /// A plan whose `emit` entries replace the full parameter list.
    pub fn replace() -> Self {
        Self {
            table_fallthrough: false,
            ..Self::default()
        }
    }

    /// A plan that adjusts the table-driven parameter set.
    pub fn adjust() -> Self {
        Self {
            table_fallthrough: true,
            ..Self::default()
        }
    }

    pub fn emit(mut self, entry: ParamEntry) -> Self {
        self.emit.push(entry);
        self
    }

    pub fn suppress(mut self, param_name: impl Into<String>) -> Self {
        self.suppress.push(param_name.into());
        self
    }
}

/// An override function: pure transformation of one node's parameter set.
pub type OverrideFn = fn(&ShaderNode, &NodeLookup<'_>) -> ParamPlan;

/// Registry of special-case overrides, keyed by node type.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    entries: HashMap<String, OverrideFn>,
}

impl OverrideRegistry {
    /// An empty registry (pure table-driven translation).
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in overrides for the stock node types.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        // Distinct literal keys, registration cannot collide.
        registry.entries.insert("BSDF_GLOSSY".into(), glossy);
        registry.entries.insert("BSDF_GLASS".into(), glass);
        registry.entries.insert("EMISSION".into(), emission);
        registry.entries.insert("BSDF_PRINCIPLED".into(), principled);
        registry
    }

    /// Register an override for a node type.
    ///
    /// Two overrides for the same type would make translation ambiguous,
    /// so a duplicate registration is a configuration error.
    pub fn register(&mut self, node_type: impl Into<String>, f: OverrideFn) -> Result<()> {
        let node_type = node_type.into();
        if self.entries.contains_key(&node_type) {
            return Err(Error::Configuration(format!(
                "override for node type '{node_type}' registered twice"
            )));
        }
        self.entries.insert(node_type, f);
        Ok(())
    }

    /// Apply the override registered for this node's type, if any.
    pub fn resolve(&self, node: &ShaderNode, lookup: &NodeLookup<'_>) -> Option<ParamPlan> {
        self.entries.get(&node.node_type).map(|f| f(node, lookup))
    }
}

/// Glossy: roughness is squared into the target's `alpha`, and the diffuse
/// lobe is forced to zero no matter what the Color input holds (even a
/// linked texture must not leak into `kd`).
fn glossy(node: &ShaderNode, _lookup: &NodeLookup<'_>) -> ParamPlan {
    let roughness = node.scalar("Roughness").unwrap_or(0.5);
    let alpha = roughness * roughness;
    ParamPlan::adjust()
        .suppress("Color")
        .suppress("Roughness")
        .emit(ParamEntry::new("color", "kd", format_color(&[0.0, 0.0, 0.0])))
        .emit(ParamEntry::new("float", "alpha", format_scalar(alpha)))
}

/// Glass: roughness and color are ignored, and no external-IOR parameter
/// is ever emitted (the renderer default applies). The interior IOR still
/// falls through the tables.
fn glass(_node: &ShaderNode, _lookup: &NodeLookup<'_>) -> ParamPlan {
    ParamPlan::adjust().suppress("Roughness").suppress("Color")
}

/// Emission: strength and color collapse into a single radiance entry.
fn emission(node: &ShaderNode, _lookup: &NodeLookup<'_>) -> ParamPlan {
    let color = node.color("Color").unwrap_or([1.0, 1.0, 1.0, 1.0]);
    let strength = node.scalar("Strength").unwrap_or(1.0);
    let radiance = [
        color[0] * strength,
        color[1] * strength,
        color[2] * strength,
    ];
    ParamPlan::replace().emit(ParamEntry::new("color", "radiance", format_color(&radiance)))
}

/// Principled: the Disney mapping. Weights pass through under renamed
/// parameters, RGB tints convert to the target's scalar tints, and coat
/// roughness inverts into clearcoat gloss. Linked inputs are left to the
/// translator's nesting path (a literal is only read when present).
fn principled(node: &ShaderNode, _lookup: &NodeLookup<'_>) -> ParamPlan {
    let mut plan = ParamPlan::replace();
    let base_color = node.color("Base Color");

    if let Some(color) = base_color {
        plan = plan.emit(ParamEntry::new("color", "baseColor", format_color(&color)));
    }
    if let Some(v) = scalar_any(node, &["Subsurface Weight", "Subsurface"]) {
        plan = plan.emit(ParamEntry::new("float", "subsurface", format_scalar(v)));
    }
    if let Some(v) = node.scalar("Metallic") {
        plan = plan.emit(ParamEntry::new("float", "metallic", format_scalar(v)));
    }
    if let Some(v) = scalar_any(node, &["Specular IOR Level", "Specular"]) {
        plan = plan.emit(ParamEntry::new("float", "specular", format_scalar(v)));
    }
    if let Some(tint) = node.color("Specular Tint") {
        let v = tint_factor(base_color, tint);
        plan = plan.emit(ParamEntry::new("float", "specularTint", format_scalar(v)));
    }
    if let Some(v) = node.scalar("Roughness") {
        plan = plan.emit(ParamEntry::new("float", "roughness", format_scalar(v)));
    }
    if let Some(v) = scalar_any(node, &["Sheen Weight", "Sheen"]) {
        plan = plan.emit(ParamEntry::new("float", "sheen", format_scalar(v)));
    }
    if let Some(tint) = node.color("Sheen Tint") {
        let v = tint_factor(base_color, tint);
        plan = plan.emit(ParamEntry::new("float", "sheenTint", format_scalar(v)));
    }
    if let Some(v) = scalar_any(node, &["Coat Weight", "Clearcoat"]) {
        plan = plan.emit(ParamEntry::new("float", "clearcoat", format_scalar(v)));
    }
    if let Some(v) = scalar_any(node, &["Coat Roughness", "Clearcoat Roughness"]) {
        // The target parameterizes gloss, not roughness
        plan = plan.emit(ParamEntry::new(
            "float",
            "clearcoatGloss",
            format_scalar(1.0 - v),
        ));
    }
    plan
}

/// First literal scalar found among alternative parameter names (newer
/// hosts renamed several principled inputs).
fn scalar_any(node: &ShaderNode, names: &[&str]) -> Option<f32> {
    names.iter().find_map(|name| node.scalar(name))
}

/// Convert an absolute RGB tint to the target's scalar tint factor.
///
/// The target blends `(1 - t) * white + t * baseColor`; solving per
/// channel gives `t = (tint - 1) / (base - 1)`, clamped to `[0, 1]` and
/// averaged. A white base channel is degenerate: the tint there is `0`
/// when the tint channel is white too, else `1`.
fn tint_factor(base_color: Option<[f32; 4]>, tint: [f32; 4]) -> f32 {
    let base = base_color.unwrap_or([0.5, 0.5, 0.5, 1.0]);
    let mut sum = 0.0;
    for i in 0..3 {
        let denominator = base[i] - 1.0;
        sum += if denominator.abs() > 1e-4 {
            ((tint[i] - 1.0) / denominator).clamp(0.0, 1.0)
        } else if tint[i] >= 0.9999 {
            0.0
        } else {
            1.0
        };
    }
    sum / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Param, ParamValue};
    use approx::assert_relative_eq;

    fn node(node_type: &str, params: Vec<(&str, ParamValue)>) -> ShaderNode {
        ShaderNode {
            id: "n".into(),
            node_type: node_type.into(),
            params: params
                .into_iter()
                .map(|(name, value)| Param {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    const LOOKUP: NodeLookup<'static> = NodeLookup {
        tag: "bsdf",
        target_type: None,
    };

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = OverrideRegistry::builtin();
        let result = registry.register("BSDF_GLOSSY", glass);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn unregistered_type_resolves_to_none() {
        let registry = OverrideRegistry::builtin();
        let diffuse = node("BSDF_DIFFUSE", vec![]);
        assert!(registry.resolve(&diffuse, &LOOKUP).is_none());
    }

    #[test]
    fn glossy_squares_roughness_and_darkens_kd() {
        let glossy_node = node(
            "BSDF_GLOSSY",
            vec![
                ("Color", ParamValue::Color([0.9, 0.9, 0.9, 1.0])),
                ("Roughness", ParamValue::Scalar(0.3)),
            ],
        );
        let plan = glossy(&glossy_node, &LOOKUP);
        assert!(plan.table_fallthrough);
        assert_eq!(plan.suppress, vec!["Color", "Roughness"]);
        assert_eq!(plan.emit[0], ParamEntry::new("color", "kd", "0,0,0"));
        let alpha: f32 = plan.emit[1].value.parse().expect("alpha is numeric");
        assert_relative_eq!(alpha, 0.09, epsilon = 1e-6);
    }

    #[test]
    fn glass_suppresses_without_emitting() {
        let glass_node = node(
            "BSDF_GLASS",
            vec![
                ("Color", ParamValue::Color([1.0; 4])),
                ("Roughness", ParamValue::Scalar(0.2)),
                ("IOR", ParamValue::Scalar(1.45)),
            ],
        );
        let plan = glass(&glass_node, &LOOKUP);
        assert!(plan.emit.is_empty());
        assert!(plan.table_fallthrough);
        assert_eq!(plan.suppress, vec!["Roughness", "Color"]);
    }

    #[test]
    fn emission_combines_strength_and_color() {
        let emission_node = node(
            "EMISSION",
            vec![
                ("Color", ParamValue::Color([1.0, 0.5, 0.25, 1.0])),
                ("Strength", ParamValue::Scalar(4.0)),
            ],
        );
        let plan = emission(&emission_node, &LOOKUP);
        assert!(!plan.table_fallthrough);
        assert_eq!(plan.emit, vec![ParamEntry::new("color", "radiance", "4,2,1")]);
    }

    #[test]
    fn principled_inverts_coat_roughness() {
        let principled_node = node(
            "BSDF_PRINCIPLED",
            vec![
                ("Base Color", ParamValue::Color([0.5, 0.5, 0.5, 1.0])),
                ("Coat Weight", ParamValue::Scalar(1.0)),
                ("Coat Roughness", ParamValue::Scalar(0.25)),
            ],
        );
        let plan = principled(&principled_node, &LOOKUP);
        let gloss = plan
            .emit
            .iter()
            .find(|p| p.name == "clearcoatGloss")
            .expect("gloss emitted");
        assert_eq!(gloss.value, "0.75");
    }

    #[test]
    fn principled_skips_linked_inputs() {
        let principled_node = node(
            "BSDF_PRINCIPLED",
            vec![
                ("Base Color", ParamValue::Link(3)),
                ("Metallic", ParamValue::Scalar(1.0)),
            ],
        );
        let plan = principled(&principled_node, &LOOKUP);
        assert!(plan.emit.iter().all(|p| p.name != "baseColor"));
        assert!(plan.emit.iter().any(|p| p.name == "metallic"));
    }

    #[test]
    fn tint_factor_endpoints() {
        // A white tint on a non-white base means "no tint"
        assert_relative_eq!(
            tint_factor(Some([0.5, 0.5, 0.5, 1.0]), [1.0, 1.0, 1.0, 1.0]),
            0.0,
            epsilon = 1e-6
        );
        // A tint equal to the base means "fully tinted"
        assert_relative_eq!(
            tint_factor(Some([0.5, 0.5, 0.5, 1.0]), [0.5, 0.5, 0.5, 1.0]),
            1.0,
            epsilon = 1e-6
        );
        // White base channels: white tint stays untinted
        assert_relative_eq!(
            tint_factor(Some([1.0, 1.0, 1.0, 1.0]), [1.0, 1.0, 1.0, 1.0]),
            0.0,
            epsilon = 1e-6
        );
    }
}
