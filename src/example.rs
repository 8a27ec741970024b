//! Example synthesis - representative values for schema nodes.
//!
//! Explicit `example` values always win. Objects are synthesized property by
//! property in declaration order, arrays as a single-element list, and
//! primitives fall back to `default`, the first `enum` value, and finally the
//! well-known value for their format or type.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::document::{last_segment, ref_of, SchemaDocument, MAX_DEPTH};
use crate::error::ResolveError;
use crate::node::Node;
use crate::types::{default_example, FormatOptions};

/// Synthesize an example for a schema (a link body, a target schema, a resource).
///
/// Primitive schemas fall back like a single property does. Returns `None`
/// only when nothing applies, such as an object without `properties`.
///
/// # Errors
///
/// Propagates unresolvable references and `RecursionLimit` for cyclic schemas.
pub fn synthesize(doc: &SchemaDocument, schema: &Value) -> Result<Option<Value>, ResolveError> {
    schema_example(doc, schema, 0)
}

/// Synthesize an example for a single property value.
pub fn value_example(doc: &SchemaDocument, node: &Value) -> Result<Option<Value>, ResolveError> {
    property_example(doc, node, 0)
}

/// Serialize a literal with the configured indentation and key order.
pub fn render(value: &Value, format: &FormatOptions) -> String {
    let value = if format.sort_keys {
        sort_keys(value)
    } else {
        value.clone()
    };

    let indent = " ".repeat(format.indent);
    let mut buf = Vec::new();
    let written = {
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser).is_ok()
    };
    if written {
        if let Ok(rendered) = String::from_utf8(buf) {
            return rendered;
        }
    }
    value.to_string()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn check_depth(depth: usize, node: &Value) -> Result<(), ResolveError> {
    if depth > MAX_DEPTH {
        return Err(ResolveError::RecursionLimit {
            limit: MAX_DEPTH,
            at: ref_of(node).unwrap_or("inline schema").to_string(),
        });
    }
    Ok(())
}

fn schema_example(
    doc: &SchemaDocument,
    schema: &Value,
    depth: usize,
) -> Result<Option<Value>, ResolveError> {
    check_depth(depth, schema)?;
    let node = Node(doc.dereference(schema)?.node);

    if let Some(example) = node.get("example") {
        return Ok(Some(example.clone()));
    }

    if let Some(properties) = node.properties() {
        let mut example = Map::new();
        for (key, property) in properties {
            let value = property_example(doc, property, depth + 1)?;
            example.insert(key.clone(), value.unwrap_or(Value::Null));
        }
        return Ok(Some(Value::Object(example)));
    }

    property_example(doc, node.value(), depth + 1)
}

fn property_example(
    doc: &SchemaDocument,
    property: &Value,
    depth: usize,
) -> Result<Option<Value>, ResolveError> {
    check_depth(depth, property)?;
    let node = Node(doc.dereference(property)?.node);

    if let Some(example) = node.get("example") {
        return Ok(Some(example.clone()));
    }

    // Prefer an identity branch when a union offers one.
    if let Some(branches) = node.any_of() {
        let branch = branches
            .iter()
            .find(|b| ref_of(b).map(last_segment) == Some("id"))
            .or_else(|| branches.first());
        if let Some(branch) = branch {
            return property_example(doc, branch, depth + 1);
        }
    }

    if let Some(branch) = node.one_of().and_then(<[Value]>::first) {
        return property_example(doc, branch, depth + 1);
    }

    if node.properties().is_some() {
        return schema_example(doc, node.value(), depth + 1);
    }

    if let Some(items) = node.items() {
        let element = property_example(doc, items, depth + 1)?;
        return Ok(Some(Value::Array(vec![element.unwrap_or(Value::Null)])));
    }

    if let Some(default) = node.get("default") {
        return Ok(Some(default.clone()));
    }

    if let Some(first) = node.enum_values().and_then(<[Value]>::first) {
        return Ok(Some(first.clone()));
    }

    Ok(node
        .format()
        .and_then(default_example)
        .or_else(|| node.primary_type().and_then(default_example)))
}
