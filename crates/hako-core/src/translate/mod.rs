//! Shader graph translation
//!
//! Walks a material's node graph depth-first from its surface root and
//! produces a nested [`TargetElement`] tree mirroring the graph's data-flow
//! links. Every node resolves through the mapping tables; nodes with a
//! registered override get their parameter set adjusted or replaced first.
//!
//! Unsupported nodes and parameters are skipped with a warning, never
//! guessed at: the output is a deterministic function of the graph, the
//! tables, and the registered overrides.

mod overrides;

pub use overrides::{NodeLookup, OverrideFn, OverrideRegistry, ParamPlan};

use crate::document::{ParamEntry, TargetElement, format_color, format_scalar, format_vector};
use crate::graph::{NodeId, ParamValue, ShaderGraph};
use crate::mapping::MappingTables;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// Hard ceiling on nodes visited per material. Shader graphs are tiny;
/// hitting this means the host handed us something malformed.
const MAX_VISITED_NODES: usize = 4096;

/// A non-fatal notice recorded while translating or assembling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Node type absent from `node_tag_map`; the node was omitted.
    UnsupportedNode { node: String, node_type: String },
    /// Parameter name or kind absent from the tables; the parameter was
    /// skipped rather than emitted half-named.
    UnsupportedParameter { node: String, name: String },
    /// A node was reached twice in one pass (unexpected back-edge).
    RevisitedNode { node: String },
    /// A link points at a node index outside the graph.
    DanglingLink { node: String, target: NodeId },
    /// A material graph could not be translated; the fallback material
    /// stands in for it.
    MaterialFallback { material: String, reason: String },
    /// A mesh without a usable material assignment.
    MissingMaterial {
        mesh: String,
        material: Option<String>,
    },
    /// An area light naming a mesh the scene does not contain.
    MissingEmitterMesh { mesh: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnsupportedNode { node, node_type } => {
                write!(f, "unsupported node '{node}' of type '{node_type}' skipped")
            }
            Warning::UnsupportedParameter { node, name } => {
                write!(f, "parameter '{name}' on node '{node}' has no mapping, skipped")
            }
            Warning::RevisitedNode { node } => {
                write!(f, "node '{node}' reached more than once, revisit ignored")
            }
            Warning::DanglingLink { node, target } => {
                write!(f, "node '{node}' links to missing node index {target}")
            }
            Warning::MaterialFallback { material, reason } => {
                write!(f, "material '{material}' not translated ({reason}), fallback used")
            }
            Warning::MissingMaterial { mesh, material } => match material {
                Some(material) => write!(
                    f,
                    "mesh '{mesh}' references unknown material '{material}', fallback used"
                ),
                None => write!(f, "mesh '{mesh}' has no material, fallback used"),
            },
            Warning::MissingEmitterMesh { mesh } => {
                write!(f, "area light references unknown mesh '{mesh}', skipped")
            }
        }
    }
}

/// Result of translating one material graph.
#[derive(Debug, Clone)]
pub struct Translation {
    /// The translated element, or `None` when the surface root itself is
    /// unsupported (the warnings say why).
    pub element: Option<TargetElement>,
    pub warnings: Vec<Warning>,
}

/// Per-material transient state for one translation pass.
struct TranslationContext {
    visited: HashSet<NodeId>,
    warnings: Vec<Warning>,
}

impl TranslationContext {
    fn new() -> Self {
        Self {
            visited: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Mark a node visited; `false` means it was seen before.
    fn visit(&mut self, id: NodeId) -> bool {
        self.visited.insert(id)
    }

    fn warn(&mut self, warning: Warning) {
        tracing::debug!("{warning}");
        self.warnings.push(warning);
    }
}

/// Translates material graphs against a table set and override registry.
///
/// Borrows both shared, read-only; create once per export and reuse across
/// materials.
pub struct Translator<'a> {
    tables: &'a MappingTables,
    overrides: &'a OverrideRegistry,
}

impl<'a> Translator<'a> {
    pub fn new(tables: &'a MappingTables, overrides: &'a OverrideRegistry) -> Self {
        Self { tables, overrides }
    }

    /// Translate a material graph starting at its surface root.
    ///
    /// `Err(Structural)` covers graphs that cannot be walked at all (no
    /// output node, unlinked surface input, runaway size). An unsupported
    /// root is not an error: it yields `element: None` plus a warning, and
    /// the caller decides how to degrade.
    pub fn translate(&self, graph: &ShaderGraph) -> Result<Translation> {
        let root = graph.surface_root()?;
        let mut ctx = TranslationContext::new();
        let element = self.translate_node(graph, root, &mut ctx)?;
        Ok(Translation {
            element,
            warnings: ctx.warnings,
        })
    }

    fn translate_node(
        &self,
        graph: &ShaderGraph,
        id: NodeId,
        ctx: &mut TranslationContext,
    ) -> Result<Option<TargetElement>> {
        if !ctx.visit(id) {
            let node = graph.node(id).map_or_else(String::new, |n| n.id.clone());
            ctx.warn(Warning::RevisitedNode { node });
            return Ok(None);
        }
        if ctx.visited.len() > MAX_VISITED_NODES {
            return Err(Error::Structural(format!(
                "material graph exceeds {MAX_VISITED_NODES} nodes"
            )));
        }

        // graph.node() only fails for dangling links, warned at the caller
        let Some(node) = graph.node(id) else {
            return Ok(None);
        };

        let Some(tag) = self.tables.lookup_tag(&node.node_type) else {
            ctx.warn(Warning::UnsupportedNode {
                node: node.id.clone(),
                node_type: node.node_type.clone(),
            });
            return Ok(None);
        };
        let target_type = self.tables.lookup_type(&node.node_type);

        let mut element = TargetElement::new(tag);
        if let Some(target_type) = target_type {
            element.set_attr("type", target_type);
        }

        let lookup = NodeLookup { tag, target_type };
        let plan = self
            .overrides
            .resolve(node, &lookup)
            .unwrap_or_else(ParamPlan::adjust);

        for param in &node.params {
            if plan.suppress.iter().any(|s| *s == param.name) {
                continue;
            }

            // Linked inputs recurse; the translated child nests under this
            // element carrying the mapped parameter name.
            if let ParamValue::Link(target) = param.value {
                if graph.node(target).is_none() {
                    ctx.warn(Warning::DanglingLink {
                        node: node.id.clone(),
                        target,
                    });
                    continue;
                }
                if let Some(mut child) = self.translate_node(graph, target, ctx)? {
                    if let Some(name) =
                        self.tables.lookup_parameter_name(&node.node_type, &param.name)
                    {
                        child.set_attr("name", name);
                    }
                    element.push_child(child);
                }
                // An unsupported child simply omits this input; the
                // warning was recorded while visiting it.
                continue;
            }

            if !plan.table_fallthrough {
                continue;
            }

            let Some(name) = self
                .tables
                .lookup_parameter_name(&node.node_type, &param.name)
            else {
                ctx.warn(Warning::UnsupportedParameter {
                    node: node.id.clone(),
                    name: param.name.clone(),
                });
                continue;
            };
            let Some(param_tag) = self.tables.lookup_parameter_tag(param.value.kind()) else {
                ctx.warn(Warning::UnsupportedParameter {
                    node: node.id.clone(),
                    name: param.name.clone(),
                });
                continue;
            };
            element.push_param(ParamEntry::new(param_tag, name, literal_value(&param.value)));
        }

        // Override-synthesized entries go last, in their declared order
        for entry in plan.emit {
            element.push_param(entry);
        }

        Ok(Some(element))
    }
}

/// Render a literal parameter value in document syntax.
fn literal_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Scalar(v) => format_scalar(*v),
        ParamValue::Color(c) => format_color(c),
        ParamValue::Integer(i) => i.to_string(),
        ParamValue::Text(s) => s.clone(),
        ParamValue::Vector(v) => format_vector(*v),
        // Links never reach here; they are handled structurally above
        ParamValue::Link(_) => String::new(),
    }
}
