//! Hyper-schema documentation resolver
//!
//! Turns a JSON Hyper-Schema API description into a flat, ordered model
//! that a documentation renderer can walk without knowing anything about
//! `$ref`, `anyOf`, or nested objects.
//!
//! For every top-level resource the resolver produces:
//! - a sorted list of flattened [`Attribute`]s with type names, markdown
//!   descriptions, and example literals
//! - a [`LinkDescriptor`] per link, with a readable path, its required and
//!   optional parameters, and example request/response text
//! - a synthesized example instance
//!
//! # Example
//!
//! ```
//! use hyperschema_docs::{resolve, ResolveOptions, SchemaDocument};
//! use serde_json::json;
//!
//! let doc = SchemaDocument::new(json!({
//!     "definitions": {
//!         "post": {
//!             "definitions": {
//!                 "id": { "type": "string", "format": "uuid" },
//!                 "title": { "type": "string", "maxLength": 80 }
//!             },
//!             "properties": {
//!                 "id": { "$ref": "#/definitions/post/definitions/id" },
//!                 "title": { "$ref": "#/definitions/post/definitions/title" }
//!             },
//!             "links": [{
//!                 "method": "GET",
//!                 "rel": "self",
//!                 "href": "/posts/{(#/definitions/post/definitions/id)}"
//!             }]
//!         }
//!     },
//!     "properties": { "post": { "$ref": "#/definitions/post" } }
//! }))
//! .unwrap();
//!
//! let resolved = resolve(&doc, &ResolveOptions::new()).unwrap();
//! let post = &resolved["post"];
//!
//! assert_eq!(post.attributes[0].path, "id");
//! assert_eq!(post.attributes[0].type_name, "uuid");
//! assert_eq!(post.attributes[1].description, "**Length:** `0..80`");
//! assert_eq!(post.links[0].link_path, "/posts/{post_id}");
//! ```
//!
//! # Attribute shapes
//!
//! | Shape | Emitted as |
//! |-------|------------|
//! | nullable object or array | one attribute, never descended into |
//! | `anyOf` union | one attribute, branch descriptions merged |
//! | nested object | `parent:child` attributes |
//! | array of objects | `parent/child` attributes |
//! | array of tagged union | `parent/[TAG].child` attributes |
//! | anything else | one plain attribute |

mod attribute;
mod document;
mod error;
mod example;
mod flatten;
mod link;
mod linter;
mod loader;
mod node;
mod resolver;
mod types;

pub use attribute::{build_attribute, UNTYPED};
pub use document::{Resolved, SchemaDocument, MAX_DEPTH};
pub use error::{LoadError, ResolveError};
pub use example::{render, synthesize};
pub use flatten::{classify, flatten, Shape};
pub use link::{status_code, LinkProcessor};
pub use linter::{lint, lint_file, lint_source, Diagnostic, LintReport, Severity};
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use node::Node;
pub use resolver::{resolve, resolve_resource};
pub use types::{
    default_example, Attribute, FormatOptions, LinkDescriptor, RequestExample, ResolveOptions,
    ResolvedResource, ResolvedSchema, ResponseExample, DEFAULT_CONTENT_TYPE,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
