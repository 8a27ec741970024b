//! Attribute flattening - turns a property tree into a sorted attribute list.
//!
//! Every property is dereferenced and then classified into exactly one
//! [`Shape`]. Classification order matters: a nullable container is never
//! descended into, and a union is documented as a single attribute even when
//! its branches are objects.

use serde_json::Value;

use crate::attribute::{build_attribute, join_literals};
use crate::document::{definition_name, last_segment, ref_of, SchemaDocument, MAX_DEPTH};
use crate::error::ResolveError;
use crate::node::Node;
use crate::types::{code_literal, default_example, Attribute};

/// Structural classification of a property node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// Nullable node with `items` or `properties`; documented as itself.
    NullableContainer,
    /// `anyOf` branches, documented as one `string` attribute.
    Union(&'a [Value]),
    /// Nested object; holds its `properties` map.
    NestedObject(&'a Value),
    /// Array whose items are objects; holds `items.properties`.
    ArrayOfObjects(&'a Value),
    /// Array whose items are a `oneOf`; holds the branches.
    ArrayOfTaggedUnion(&'a [Value]),
    Plain,
}

/// Classify a dereferenced node. Anything unrecognized is `Plain`.
pub fn classify<'a>(doc: &'a SchemaDocument, node: Node<'a>) -> Result<Shape<'a>, ResolveError> {
    if node.is_nullable() && (node.has("items") || node.has("properties")) {
        return Ok(Shape::NullableContainer);
    }

    if let Some(branches) = node.any_of() {
        return Ok(Shape::Union(branches));
    }

    if let Some(properties) = node.get("properties").filter(|p| p.is_object()) {
        return Ok(Shape::NestedObject(properties));
    }

    if let Some(items) = node.items() {
        let items = Node(doc.dereference(items)?.node);
        if let Some(properties) = items.get("properties").filter(|p| p.is_object()) {
            return Ok(Shape::ArrayOfObjects(properties));
        }
        if let Some(branches) = items.one_of() {
            return Ok(Shape::ArrayOfTaggedUnion(branches));
        }
    }

    Ok(Shape::Plain)
}

/// Flatten a `properties` map (or a reference to one) into attributes sorted by path.
///
/// # Errors
///
/// Propagates unresolvable references and `RecursionLimit` for cyclic
/// property trees.
pub fn flatten(doc: &SchemaDocument, properties: &Value) -> Result<Vec<Attribute>, ResolveError> {
    flatten_at(doc, properties, 0)
}

/// Flatten named property nodes that do not live in a single `properties` map,
/// such as the required half of a link's parameters.
pub fn flatten_entries<'v, I>(
    doc: &SchemaDocument,
    entries: I,
) -> Result<Vec<Attribute>, ResolveError>
where
    I: IntoIterator<Item = (&'v str, &'v Value)>,
{
    flatten_entries_at(doc, entries, 0)
}

fn flatten_at(
    doc: &SchemaDocument,
    properties: &Value,
    depth: usize,
) -> Result<Vec<Attribute>, ResolveError> {
    if depth > MAX_DEPTH {
        return Err(ResolveError::RecursionLimit {
            limit: MAX_DEPTH,
            at: ref_of(properties).unwrap_or("properties").to_string(),
        });
    }

    match doc.dereference(properties)?.node.as_object() {
        Some(map) => flatten_entries_at(doc, map.iter().map(|(k, v)| (k.as_str(), v)), depth),
        None => Ok(Vec::new()),
    }
}

fn flatten_entries_at<'v, I>(
    doc: &SchemaDocument,
    entries: I,
    depth: usize,
) -> Result<Vec<Attribute>, ResolveError>
where
    I: IntoIterator<Item = (&'v str, &'v Value)>,
{
    let mut attributes = Vec::new();
    for (key, value) in entries {
        let resolved = doc.dereference(value)?;
        let reference = resolved.reference.map(str::to_string);
        let node = Node(resolved.node);

        match classify(doc, node)? {
            Shape::NullableContainer => {
                let mut attribute = build_attribute(doc, key, node.value())?;
                attribute.reference = match reference {
                    Some(reference) => Some(reference),
                    None => shared_definition(doc, node)?,
                };
                attributes.push(attribute);
            }
            Shape::Union(branches) => {
                let mut attribute = union_attribute(doc, key, branches)?;
                attribute.reference = reference;
                attributes.push(attribute);
            }
            Shape::NestedObject(nested) => {
                let prefix = format!("{}:", key);
                let children = flatten_at(doc, nested, depth + 1)?;
                attributes.extend(children.into_iter().map(|a| a.nest_under(&prefix)));
            }
            Shape::ArrayOfObjects(nested) => {
                let prefix = format!("{}/", key);
                let children = flatten_at(doc, nested, depth + 1)?;
                attributes.extend(children.into_iter().map(|a| a.nest_under(&prefix)));
            }
            Shape::ArrayOfTaggedUnion(branches) => {
                for (index, branch) in branches.iter().enumerate() {
                    let branch = doc.dereference(branch)?;
                    let tag = match branch.reference {
                        Some(reference) => last_segment(reference).to_uppercase(),
                        None => index.to_string(),
                    };
                    let Some(nested) = branch.node.get("properties") else {
                        continue;
                    };
                    let prefix = format!("{}/[{}].", key, tag);
                    let children = flatten_at(doc, nested, depth + 1)?;
                    attributes.extend(children.into_iter().map(|a| a.nest_under(&prefix)));
                }
            }
            Shape::Plain => {
                let mut attribute = build_attribute(doc, key, node.value())?;
                attribute.reference = reference;
                attributes.push(attribute);
            }
        }
    }

    for attribute in &mut attributes {
        if attribute.example.is_none() {
            attribute.example = default_example(&attribute.type_name).map(|v| code_literal(&v));
        }
    }

    attributes.sort_by(|a, b| a.path.cmp(&b.path));
    attributes.dedup_by(|a, b| a.path == b.path);
    Ok(attributes)
}

/// One `string` attribute describing every branch of an `anyOf`.
fn union_attribute(
    doc: &SchemaDocument,
    key: &str,
    branches: &[Value],
) -> Result<Attribute, ResolveError> {
    let mut descriptions = Vec::new();
    let mut examples = Vec::new();
    for branch in branches {
        let branch = Node(doc.dereference(branch)?.node);
        if let Some(description) = branch.description() {
            descriptions.push(description.to_string());
        }
        if let Some(example) = branch.get("example") {
            examples.push(example.clone());
        }
    }

    // Present but empty when no branch has an example.
    Ok(Attribute::new(
        key,
        "string",
        merge_descriptions(descriptions),
        Some(join_literals(&examples)),
    ))
}

/// `"id of post"`, `"unique name of post"` -> `"id or name of post"`.
fn merge_descriptions(mut descriptions: Vec<String>) -> String {
    if descriptions.len() < 2 {
        return descriptions.pop().unwrap_or_default();
    }

    if let Some(cut) = descriptions[0].find(" of ") {
        descriptions[0].truncate(cut);
    }
    for description in descriptions.iter_mut().skip(1) {
        *description = description.replace("unique ", "");
    }

    let last = descriptions.pop().unwrap_or_default();
    format!("{} or {}", descriptions.join(", "), last)
}

/// `#/definitions/X` when every member of a container is a reference into `X`.
fn shared_definition(
    doc: &SchemaDocument,
    node: Node<'_>,
) -> Result<Option<String>, ResolveError> {
    let members = match (node.properties(), node.items()) {
        (Some(properties), _) => Some(properties),
        (None, Some(items)) => Node(doc.dereference(items)?.node).properties(),
        (None, None) => None,
    };
    let Some(members) = members else {
        return Ok(None);
    };

    let mut shared = None;
    for member in members.values() {
        let Some(name) = doc.dereference(member)?.reference.and_then(definition_name) else {
            return Ok(None);
        };
        match shared {
            Some(existing) if existing != name => return Ok(None),
            _ => shared = Some(name),
        }
    }
    Ok(shared.map(|name| format!("#/definitions/{}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::UNTYPED;
    use serde_json::json;

    fn paths(attributes: &[Attribute]) -> Vec<&str> {
        attributes.iter().map(|a| a.path.as_str()).collect()
    }

    fn doc() -> SchemaDocument {
        SchemaDocument::new(json!({
            "definitions": {
                "pet": {
                    "definitions": {
                        "dog": {
                            "properties": { "name": { "type": "string" } }
                        },
                        "cat": {
                            "properties": { "lives": { "type": "integer" } }
                        }
                    }
                },
                "user": {
                    "definitions": {
                        "id": { "type": "string", "format": "uuid", "description": "unique identifier of user" },
                        "email": { "type": "string", "format": "email", "description": "unique email address of user" },
                        "identity": {
                            "anyOf": [
                                { "$ref": "#/definitions/user/definitions/id" },
                                { "$ref": "#/definitions/user/definitions/email" }
                            ]
                        }
                    }
                },
                "tree": {
                    "properties": {
                        "branch": { "$ref": "#/definitions/tree" }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn nested_object_joins_with_colon() {
        let attrs = flatten(&doc(), &json!({
            "a": { "properties": { "b": { "type": "string" } } }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["a:b"]);
    }

    #[test]
    fn array_of_objects_joins_with_slash() {
        let attrs = flatten(&doc(), &json!({
            "list": {
                "type": ["array"],
                "items": { "properties": { "x": { "type": "integer" } } }
            }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["list/x"]);
        assert_eq!(attrs[0].example.as_deref(), Some("`42`"));
    }

    #[test]
    fn tagged_union_items_use_reference_tag_or_index() {
        let attrs = flatten(&doc(), &json!({
            "pets": {
                "type": ["array"],
                "items": {
                    "oneOf": [
                        { "$ref": "#/definitions/pet/definitions/dog" },
                        { "properties": { "color": { "type": "string" } } }
                    ]
                }
            }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["pets/[1].color", "pets/[DOG].name"]);
    }

    #[test]
    fn nullable_container_is_not_descended() {
        let attrs = flatten(&doc(), &json!({
            "owner": {
                "type": ["null", "array"],
                "items": { "properties": { "x": { "type": "string" } } }
            }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["owner"]);
        assert_eq!(attrs[0].type_name, "nullable array");
        assert_eq!(attrs[0].example.as_deref(), Some("`null`"));
    }

    #[test]
    fn nullable_container_inherits_shared_definition() {
        let attrs = flatten(&doc(), &json!({
            "owner": {
                "type": ["object", "null"],
                "properties": {
                    "id": { "$ref": "#/definitions/user/definitions/id" },
                    "email": { "$ref": "#/definitions/user/definitions/email" }
                }
            }
        }))
        .unwrap();
        assert_eq!(attrs[0].reference.as_deref(), Some("#/definitions/user"));
    }

    #[test]
    fn any_of_becomes_single_string_attribute() {
        let attrs = flatten(&doc(), &json!({
            "user": { "$ref": "#/definitions/user/definitions/identity" }
        }))
        .unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].type_name, "string");
        assert_eq!(attrs[0].description, "unique identifier or email address of user");
        assert_eq!(attrs[0].example.as_deref(), Some(""));
        assert_eq!(
            attrs[0].reference.as_deref(),
            Some("#/definitions/user/definitions/identity")
        );
    }

    #[test]
    fn any_of_examples_are_joined() {
        let attrs = flatten(&doc(), &json!({
            "size": {
                "anyOf": [
                    { "type": "integer", "example": 3 },
                    { "type": "string", "example": "large" }
                ]
            }
        }))
        .unwrap();
        assert_eq!(attrs[0].example.as_deref(), Some("`3` or `\"large\"`"));
    }

    #[test]
    fn one_of_property_is_plain() {
        let attrs = flatten(&doc(), &json!({
            "either": {
                "oneOf": [{ "type": "string" }, { "type": "integer" }]
            }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["either"]);
        assert_eq!(attrs[0].type_name, UNTYPED);
        assert_eq!(attrs[0].example, None);
    }

    #[test]
    fn output_is_sorted_by_path() {
        let attrs = flatten(&doc(), &json!({
            "zeta": { "type": "string" },
            "alpha": { "properties": { "b": { "type": "string" }, "a": { "type": "string" } } },
            "mid": { "type": "boolean" }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["alpha:a", "alpha:b", "mid", "zeta"]);
        assert_eq!(attrs[2].example.as_deref(), Some("`true`"));
    }

    #[test]
    fn items_without_shape_fall_through_to_plain() {
        let attrs = flatten(&doc(), &json!({
            "tags": { "type": ["array"], "items": { "type": "string" } }
        }))
        .unwrap();
        assert_eq!(paths(&attrs), vec!["tags"]);
        assert_eq!(attrs[0].example.as_deref(), Some("`[\"example\"]`"));
    }

    #[test]
    fn plain_attribute_keeps_reference() {
        let attrs = flatten(&doc(), &json!({
            "id": { "$ref": "#/definitions/user/definitions/id" }
        }))
        .unwrap();
        assert_eq!(
            attrs[0].reference.as_deref(),
            Some("#/definitions/user/definitions/id")
        );
        assert_eq!(attrs[0].type_name, "uuid");
    }

    #[test]
    fn broken_reference_propagates() {
        let result = flatten(&doc(), &json!({
            "ghost": { "$ref": "#/definitions/ghost" }
        }));
        assert!(matches!(
            result,
            Err(ResolveError::UnresolvableReference { .. })
        ));
    }

    #[test]
    fn cyclic_properties_hit_recursion_limit() {
        let result = flatten(&doc(), &json!({
            "root": { "$ref": "#/definitions/tree" }
        }));
        assert!(matches!(result, Err(ResolveError::RecursionLimit { .. })));
    }

    #[test]
    fn merge_single_description_is_unchanged() {
        assert_eq!(merge_descriptions(vec!["id of post".into()]), "id of post");
        assert_eq!(merge_descriptions(Vec::new()), "");
        assert_eq!(
            merge_descriptions(vec![
                "unique identifier of app".into(),
                "unique name of app".into(),
                "unique slug of app".into(),
            ]),
            "unique identifier, name of app or slug of app"
        );
    }
}
