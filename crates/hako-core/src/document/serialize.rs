//! XML rendering of the assembled document tree
//!
//! Pure text generation: stable ordering as built, 2-space indentation,
//! reserved markup characters escaped in attribute values.

// String writing is infallible, so .expect() is safe here
#![allow(clippy::expect_used)]

use super::{SceneDocument, TargetElement};
use std::fmt::Write;

/// Helper macro for writing to a String buffer.
/// String writing is infallible, so we use `expect()` with a clear message.
macro_rules! write_str {
    ($dst:expr, $($arg:tt)*) => {
        write!($dst, $($arg)*).expect("String write is infallible")
    };
}

/// Render a document to XML text.
pub fn serialize_document(doc: &SceneDocument) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    write_element(&mut out, &doc.root, 0);
    out
}

fn write_element(out: &mut String, el: &TargetElement, depth: usize) {
    let indent = "  ".repeat(depth);
    write_str!(out, "{indent}<{}", el.tag);
    for (key, value) in &el.attrs {
        write_str!(out, " {key}=\"{}\"", escape(value));
    }

    if el.params.is_empty() && el.children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");
    for param in &el.params {
        write_str!(
            out,
            "{indent}  <{} name=\"{}\" value=\"{}\"/>\n",
            param.tag,
            escape(&param.name),
            escape(&param.value)
        );
    }
    for child in &el.children {
        write_element(out, child, depth + 1);
    }
    write_str!(out, "{indent}</{}>\n", el.tag);
}

/// Escape the five reserved markup characters for attribute values.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
