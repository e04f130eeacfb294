//! Host-supplied shader graph model
//!
//! Nodes are uniform data records: a type tag, an ordered parameter list,
//! and links to other nodes. All type-specific behavior lives in the
//! mapping tables and the override registry, never in per-type code.
//!
//! Graphs are acyclic by contract (node-based shader editors enforce
//! this); the translator still guards against accidental revisits.

use crate::{Error, Result};
use glam::Vec3;
use serde::Deserialize;

/// Index of a node within its [`ShaderGraph`].
pub type NodeId = usize;

/// Node type tag of a material output node.
pub const OUTPUT_NODE_TYPE: &str = "OUTPUT_MATERIAL";

/// Name of the output node's surface input.
pub const SURFACE_INPUT: &str = "Surface";

/// A parameter value, either a literal or a link to another node's output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Scalar(f32),
    Color([f32; 4]),
    Integer(i32),
    Text(String),
    Vector(Vec3),
    /// The value comes from another node's output.
    Link(NodeId),
}

impl ParamValue {
    /// The parameter-kind key used against `type_map`.
    ///
    /// Links are structural (they become nested child elements) and are
    /// never resolved through `type_map`.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Scalar(_) => "scalar",
            ParamValue::Color(_) => "color",
            ParamValue::Integer(_) => "integer",
            ParamValue::Text(_) => "string",
            ParamValue::Vector(_) => "vector",
            ParamValue::Link(_) => "linked",
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ParamValue::Link(_))
    }

    /// Literal scalar value, if this is one.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Literal color value, if this is one.
    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            ParamValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// A named parameter on a shader node.
#[derive(Debug, Clone, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

/// A single node in a material graph (read-only view of host data).
#[derive(Debug, Clone, Deserialize)]
pub struct ShaderNode {
    /// Host-side identifier, used in warnings.
    pub id: String,
    /// Node type tag, the key into the mapping tables.
    pub node_type: String,
    /// Parameters in the node's declaration order.
    #[serde(default)]
    pub params: Vec<Param>,
}

impl ShaderNode {
    /// Look up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// Literal scalar parameter, `None` if absent or linked.
    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.param(name).and_then(ParamValue::as_scalar)
    }

    /// Literal color parameter, `None` if absent or linked.
    pub fn color(&self, name: &str) -> Option<[f32; 4]> {
        self.param(name).and_then(ParamValue::as_color)
    }
}

/// A material's node graph, addressed by node index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShaderGraph {
    pub nodes: Vec<ShaderNode>,
}

impl ShaderGraph {
    pub fn node(&self, id: NodeId) -> Option<&ShaderNode> {
        self.nodes.get(id)
    }

    /// First material output node, if any.
    ///
    /// When a graph carries several output nodes the first one wins; the
    /// host does not define which is active, so "first encountered" is the
    /// documented behavior.
    pub fn find_output(&self) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.node_type == OUTPUT_NODE_TYPE)
    }

    /// The shader node linked into the output node's surface input.
    ///
    /// This is where translation starts. A graph without an output node,
    /// or with an unlinked surface input, is structurally unusable.
    pub fn surface_root(&self) -> Result<NodeId> {
        let output = self
            .find_output()
            .ok_or_else(|| Error::Structural("material graph has no output node".into()))?;
        // find_output() only returns valid indices
        match self.nodes[output].param(SURFACE_INPUT) {
            Some(ParamValue::Link(root)) if *root < self.nodes.len() => Ok(*root),
            Some(ParamValue::Link(root)) => Err(Error::Structural(format!(
                "surface input links to missing node index {root}"
            ))),
            _ => Err(Error::Structural(
                "material output node has no linked surface input".into(),
            )),
        }
    }
}
