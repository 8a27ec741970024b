//! Plain attribute construction.
//!
//! The description is assembled from a fixed sequence of clause builders,
//! each returning a clause or nothing, joined with [`LINE_BREAK`].

use serde_json::Value;

use crate::document::SchemaDocument;
use crate::error::ResolveError;
use crate::example::value_example;
use crate::node::Node;
use crate::types::{code_literal, Attribute, LINE_BREAK};

/// Type name used when a node declares neither `format` nor a non-null `type`.
pub const UNTYPED: &str = "any";

type Clause = for<'a> fn(Node<'a>) -> Option<String>;

/// Clause builders in output order.
const CLAUSES: &[Clause] = &[
    description_clause,
    default_clause,
    range_clause,
    enum_clause,
    pattern_clause,
    length_clause,
];

/// Build an attribute directly from a (dereferenced) node's constraint fields.
///
/// # Errors
///
/// Only fails when a synthesized example has to follow a broken reference.
pub fn build_attribute(
    doc: &SchemaDocument,
    key: &str,
    node: &Value,
) -> Result<Attribute, ResolveError> {
    let node = Node(node);
    Ok(Attribute::new(
        key,
        type_name(node),
        describe(node),
        example_literal(doc, node)?,
    ))
}

/// Description with all applicable constraint clauses.
pub fn describe(node: Node<'_>) -> String {
    CLAUSES
        .iter()
        .filter_map(|clause| clause(node))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

/// `nullable ` prefix, then the format or the primary type.
pub fn type_name(node: Node<'_>) -> String {
    let base = node
        .format()
        .or_else(|| node.primary_type())
        .unwrap_or(UNTYPED);
    if node.is_nullable() {
        format!("nullable {}", base)
    } else {
        base.to_string()
    }
}

/// Example literal: explicit example, then a synthesized one for arrays and
/// enums, then `null` for nullable nodes.
pub fn example_literal(
    doc: &SchemaDocument,
    node: Node<'_>,
) -> Result<Option<String>, ResolveError> {
    if let Some(example) = node.get("example") {
        let alternatives = example.get("oneOf").and_then(Value::as_array);
        return Ok(Some(match alternatives {
            Some(alternatives) => join_literals(alternatives),
            None => code_literal(example),
        }));
    }

    if (node.is_array_only() && node.has("items")) || node.has("enum") {
        let example = value_example(doc, node.value())?.unwrap_or(Value::Null);
        return Ok(Some(code_literal(&example)));
    }

    if node.is_nullable() {
        return Ok(Some(code_literal(&Value::Null)));
    }

    Ok(None)
}

/// `` `a` or `b` `` for a list of values.
pub fn join_literals(values: &[Value]) -> String {
    values
        .iter()
        .map(code_literal)
        .collect::<Vec<_>>()
        .join(" or ")
}

fn description_clause(node: Node<'_>) -> Option<String> {
    node.description()
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn default_clause(node: Node<'_>) -> Option<String> {
    node.get("default")
        .map(|default| format!("**default:** {}", code_literal(default)))
}

fn range_clause(node: Node<'_>) -> Option<String> {
    let minimum = node.get("minimum");
    let maximum = node.get("maximum");
    if minimum.is_none() && maximum.is_none() {
        return None;
    }

    let mut range = String::new();
    if let Some(minimum) = minimum {
        let cmp = comparator(node.flag("exclusiveMinimum"));
        range.push_str(&format!("{} {} ", minimum, cmp));
    }
    range.push_str("value");
    if let Some(maximum) = maximum {
        let cmp = comparator(node.flag("exclusiveMaximum"));
        range.push_str(&format!(" {} {}", cmp, maximum));
    }
    Some(format!("**Range:** `{}`", range))
}

fn comparator(exclusive: bool) -> &'static str {
    if exclusive {
        "<"
    } else {
        "<="
    }
}

fn enum_clause(node: Node<'_>) -> Option<String> {
    node.enum_values()
        .map(|values| format!("**one of:** {}", join_literals(values)))
}

fn pattern_clause(node: Node<'_>) -> Option<String> {
    node.str_field("pattern")
        .map(|pattern| format!("**pattern:** `{}`", pattern))
}

fn length_clause(node: Node<'_>) -> Option<String> {
    let min = node.get("minLength");
    let max = node.get("maxLength");
    if min.is_none() && max.is_none() {
        return None;
    }

    let mut length = min.map(Value::to_string).unwrap_or_default();
    if min != max {
        match max {
            Some(max) => {
                if min.is_none() {
                    length.push('0');
                }
                length.push_str(&format!("..{}", max));
            }
            None => length.push_str("..∞"),
        }
    }
    Some(format!("**Length:** `{}`", length))
}
