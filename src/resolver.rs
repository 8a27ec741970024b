//! Resolution driver - turns a schema document into resolved resources.

use serde_json::Value;

use crate::document::{definition_name, SchemaDocument};
use crate::error::ResolveError;
use crate::example::{render, synthesize};
use crate::flatten::flatten;
use crate::link::LinkProcessor;
use crate::node::Node;
use crate::types::{ResolveOptions, ResolvedResource, ResolvedSchema};

/// Resolve every top-level resource, in declaration order.
///
/// Resolution is all or nothing: the first failing resource aborts the run.
///
/// # Errors
///
/// Returns `ResolveError::Resource` naming the failing resource and wrapping
/// the underlying error.
pub fn resolve<'a>(
    doc: &'a SchemaDocument,
    options: &ResolveOptions,
) -> Result<ResolvedSchema<'a>, ResolveError> {
    let mut resolved = ResolvedSchema::new();

    for (name, declaration) in doc.resources() {
        let resource = resolve_resource(doc, name, declaration, options).map_err(|e| {
            tracing::error!(resource = %name, error = %e, "error in resource");
            e.in_resource(name)
        })?;

        tracing::debug!(
            resource = %name,
            attributes = resource.attributes.len(),
            links = resource.links.len(),
            "resolved resource"
        );
        resolved.insert(name.clone(), resource);
    }

    Ok(resolved)
}

/// Resolve a single resource declaration.
///
/// # Errors
///
/// Returns the underlying `ResolveError` without a resource annotation.
pub fn resolve_resource<'a>(
    doc: &'a SchemaDocument,
    name: &str,
    declaration: &'a Value,
    options: &ResolveOptions,
) -> Result<ResolvedResource<'a>, ResolveError> {
    let resolved = doc.dereference(declaration)?;
    let node = Node(resolved.node);

    let mut attributes = match node.get("properties") {
        Some(properties) => flatten(doc, properties)?,
        None => Vec::new(),
    };
    for attribute in &mut attributes {
        attribute.linked_resource = attribute
            .reference
            .as_deref()
            .and_then(definition_name)
            .filter(|definition| *definition != name)
            .map(str::to_string);
    }

    let example = synthesize(doc, node.value())?;

    let processor = LinkProcessor::new(doc, options, example.as_ref());
    let links = match node.get("links").and_then(Value::as_array) {
        Some(links) => links
            .iter()
            .enumerate()
            .map(|(index, link)| processor.process(index, link))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(ResolvedResource {
        name: name.to_string(),
        title: node.str_field("title").map(str::to_string),
        description: node.description().map(str::to_string),
        reference: resolved.reference.map(str::to_string),
        schema: resolved.node,
        attributes,
        links,
        example: example.as_ref().map(|v| render(v, &options.format)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> SchemaDocument {
        SchemaDocument::new(json!({
            "definitions": {
                "user": {
                    "title": "User",
                    "definitions": {
                        "id": { "type": "string", "format": "uuid" },
                        "name": { "type": "string", "example": "ada" }
                    },
                    "properties": {
                        "id": { "$ref": "#/definitions/user/definitions/id" },
                        "name": { "$ref": "#/definitions/user/definitions/name" }
                    },
                    "links": [
                        { "method": "GET", "rel": "self", "href": "/users/{(#/definitions/user/definitions/id)}" }
                    ]
                },
                "post": {
                    "description": "A blog post",
                    "definitions": {
                        "title": { "type": "string" }
                    },
                    "properties": {
                        "title": { "$ref": "#/definitions/post/definitions/title" },
                        "author": { "$ref": "#/definitions/user/definitions/id" }
                    }
                }
            },
            "properties": {
                "user": { "$ref": "#/definitions/user" },
                "post": { "$ref": "#/definitions/post" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn resources_keep_declaration_order() {
        let doc = doc();
        let resolved = resolve(&doc, &ResolveOptions::new()).unwrap();
        let names: Vec<_> = resolved.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["user", "post"]);
    }

    #[test]
    fn resource_carries_metadata_and_example() {
        let doc = doc();
        let resolved = resolve(&doc, &ResolveOptions::new()).unwrap();
        let user = &resolved["user"];
        assert_eq!(user.title.as_deref(), Some("User"));
        assert_eq!(user.reference.as_deref(), Some("#/definitions/user"));
        assert!(std::ptr::eq(user.schema, doc.pointer("#/definitions/user").unwrap()));

        let example: Value = serde_json::from_str(user.example.as_deref().unwrap()).unwrap();
        assert_eq!(
            example,
            json!({ "id": "01234567-89ab-cdef-0123-456789abcdef", "name": "ada" })
        );
        assert_eq!(user.links[0].link_path, "/users/{user_id}");
    }

    #[test]
    fn cross_resource_attributes_are_linked() {
        let doc = doc();
        let resolved = resolve(&doc, &ResolveOptions::new()).unwrap();
        let post = &resolved["post"];
        let author = post.attributes.iter().find(|a| a.path == "author").unwrap();
        assert_eq!(author.linked_resource.as_deref(), Some("user"));
        let title = post.attributes.iter().find(|a| a.path == "title").unwrap();
        assert_eq!(title.linked_resource, None);
    }

    #[test]
    fn failure_names_the_resource() {
        let doc = SchemaDocument::new(json!({
            "properties": {
                "ok": { "properties": { "a": { "type": "string" } } },
                "broken": {
                    "properties": { "b": { "$ref": "#/definitions/missing" } }
                }
            }
        }))
        .unwrap();
        let err = resolve(&doc, &ResolveOptions::new()).unwrap_err();
        assert_eq!(err.resource(), Some("broken"));
        assert!(matches!(
            err.root_cause(),
            ResolveError::UnresolvableReference { .. }
        ));
    }

    #[test]
    fn malformed_link_aborts_resource() {
        let doc = SchemaDocument::new(json!({
            "properties": {
                "thing": { "links": [{ "method": "GET" }] }
            }
        }))
        .unwrap();
        let err = resolve(&doc, &ResolveOptions::new()).unwrap_err();
        assert_eq!(err.resource(), Some("thing"));
        assert!(matches!(
            err.root_cause(),
            ResolveError::MalformedLink { index: 0, field: "href" }
        ));
    }

    #[test]
    fn resource_without_properties_has_no_attributes() {
        let doc = SchemaDocument::new(json!({
            "properties": { "ping": { "type": "object" } }
        }))
        .unwrap();
        let resolved = resolve(&doc, &ResolveOptions::new()).unwrap();
        assert!(resolved["ping"].attributes.is_empty());
        assert_eq!(resolved["ping"].example, None);
    }
}
