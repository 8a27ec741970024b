//! The schema document and JSON-Pointer reference resolution.
//!
//! Definitions are never copied: a reference is a lookup key into the
//! document, and every resolved node is a borrow of the document's tree.

use serde_json::{Map, Value};

use crate::error::{LoadError, ResolveError};
use crate::types::json_type_name;

/// Bound on reference chains and tree descent.
///
/// Cyclic schemas are not broken up; they fail with
/// [`ResolveError::RecursionLimit`] once this depth is exceeded.
pub const MAX_DEPTH: usize = 64;

/// A node reached through zero or more `$ref` hops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    /// Last reference followed, `None` if the node was inline.
    pub reference: Option<&'a str>,
    pub node: &'a Value,
}

/// A loaded hyper-schema document. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    root: Value,
}

impl SchemaDocument {
    /// Wrap a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidDocument` if the root is not an object, or if
    /// `properties` or `definitions` is present but not an object.
    pub fn new(root: Value) -> Result<Self, LoadError> {
        let Some(map) = root.as_object() else {
            return Err(LoadError::InvalidDocument {
                message: format!("expected object at root, got {}", json_type_name(&root)),
            });
        };
        for key in ["properties", "definitions"] {
            if let Some(section) = map.get(key) {
                if !section.is_object() {
                    return Err(LoadError::InvalidDocument {
                        message: format!(
                            "expected \"{}\" to be an object, got {}",
                            key,
                            json_type_name(section)
                        ),
                    });
                }
            }
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Top-level resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::iter)
    }

    /// Named definitions under `definitions`.
    pub fn definitions(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get("definitions")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::iter)
    }

    /// The `href` of the root's `rel: "self"` link, or `""`.
    pub fn base_href(&self) -> &str {
        self.root
            .get("links")
            .and_then(Value::as_array)
            .and_then(|links| {
                links
                    .iter()
                    .find(|link| link.get("rel").and_then(Value::as_str) == Some("self"))
            })
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Look up a JSON Pointer without following any `$ref` at the target.
    ///
    /// Anything before `#/` (a document URI) is ignored, as is a bare `#`.
    pub fn pointer<'a>(&'a self, reference: &str) -> Result<&'a Value, ResolveError> {
        let path = match reference.find("#/") {
            Some(idx) => &reference[idx + 2..],
            None => reference.trim_start_matches('#').trim_start_matches('/'),
        };
        if path.is_empty() {
            return Ok(&self.root);
        }

        let mut current = &self.root;
        for part in path.split('/') {
            // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
            let key = part.replace("~1", "/").replace("~0", "~");
            let next = match current {
                Value::Object(map) => map.get(&key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| ResolveError::UnresolvableReference {
                reference: reference.to_string(),
                segment: key.clone(),
            })?;
        }
        Ok(current)
    }

    /// Resolve a reference string to its canonical, non-reference node.
    ///
    /// The returned `reference` is the last pointer in the chain, which is
    /// `reference` itself when the target is not a reference.
    pub fn resolve_ref<'a>(&'a self, reference: &'a str) -> Result<Resolved<'a>, ResolveError> {
        let target = self.pointer(reference)?;
        let resolved = self.follow(target, 1, reference)?;
        Ok(Resolved {
            reference: resolved.reference.or(Some(reference)),
            node: resolved.node,
        })
    }

    /// Follow `node`'s `$ref` chain, if any.
    ///
    /// A node without `$ref` comes back unchanged with no reference. Keys next
    /// to a `$ref` are ignored in favor of the target.
    pub fn dereference<'a>(&'a self, node: &'a Value) -> Result<Resolved<'a>, ResolveError> {
        self.follow(node, 0, "")
    }

    fn follow<'a>(
        &'a self,
        node: &'a Value,
        hops: usize,
        origin: &str,
    ) -> Result<Resolved<'a>, ResolveError> {
        let mut current = Resolved {
            reference: None,
            node,
        };
        let mut hops = hops;
        while let Some(reference) = ref_of(current.node) {
            hops += 1;
            if hops > MAX_DEPTH {
                return Err(ResolveError::RecursionLimit {
                    limit: MAX_DEPTH,
                    at: if origin.is_empty() {
                        reference.to_string()
                    } else {
                        origin.to_string()
                    },
                });
            }
            current = Resolved {
                reference: Some(reference),
                node: self.pointer(reference)?,
            };
        }
        Ok(current)
    }
}

/// The `$ref` string of a node, if it has one.
pub fn ref_of(node: &Value) -> Option<&str> {
    node.get("$ref").and_then(Value::as_str)
}

/// Last `/`-separated segment of a reference.
pub fn last_segment(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// `X` for a reference of the form `#/definitions/X/...`.
pub fn definition_name(reference: &str) -> Option<&str> {
    let (_, rest) = reference.split_once("#/definitions/")?;
    rest.split('/').next().filter(|name| !name.is_empty())
}
