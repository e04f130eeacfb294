//! Target document model
//!
//! [`TargetElement`] is the output unit of translation and assembly: a tag,
//! ordered attributes, typed parameter entries, and nested children. The
//! tree is strictly owned, built once, then serialized without re-sorting.

mod serialize;

use glam::Vec3;

/// A typed parameter entry, serialized as a leaf element
/// (`<float name="alpha" value="0.25"/>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    /// Target parameter tag (`float`, `color`, `integer`, ...).
    pub tag: String,
    pub name: String,
    pub value: String,
}

impl ParamEntry {
    pub fn new(
        tag: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element of the target document tree.
#[derive(Debug, Clone, Default)]
pub struct TargetElement {
    pub tag: String,
    /// Attributes in emission order (`type`, `id`, `name`, ...).
    pub attrs: Vec<(String, String)>,
    /// Parameter entries, emitted before any children.
    pub params: Vec<ParamEntry>,
    pub children: Vec<TargetElement>,
}

impl TargetElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Set an attribute, replacing an existing one with the same key.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attrs.push((key, value));
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push_param(&mut self, param: ParamEntry) {
        self.params.push(param);
    }

    pub fn push_child(&mut self, child: TargetElement) {
        self.children.push(child);
    }

    /// Find a parameter entry by its target name.
    pub fn param(&self, name: &str) -> Option<&ParamEntry> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// The root document owning all translated elements for one export.
#[derive(Debug, Clone)]
pub struct SceneDocument {
    pub root: TargetElement,
}

impl SceneDocument {
    pub fn new(root: TargetElement) -> Self {
        Self { root }
    }

    /// Render the document to XML text.
    ///
    /// Deterministic: attribute, parameter, and child order is exactly as
    /// produced by the translator and assembler.
    pub fn serialize(&self) -> String {
        serialize::serialize_document(self)
    }
}

/// Round to 4 decimal places, the precision carried into the document.
fn round4(v: f32) -> f32 {
    (v * 10_000.0).round() / 10_000.0
}

/// Format a scalar for a parameter value (`0.64`, not `0.64000004`).
pub fn format_scalar(v: f32) -> String {
    format!("{}", round4(v))
}

/// Format a color as `r,g,b`; a trailing alpha channel is dropped.
pub fn format_color(channels: &[f32]) -> String {
    channels
        .iter()
        .take(3)
        .map(|v| format_scalar(*v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Format a vector as `x,y,z`.
pub fn format_vector(v: Vec3) -> String {
    format_color(&v.to_array())
}
