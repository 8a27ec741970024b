//! Core types for hyper-schema resolution.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

/// Content type attached to non-GET request examples unless overridden.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Separator placed between description clauses.
pub const LINE_BREAK: &str = "<br/> ";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Well-known example value for a type name or string format.
///
/// Used when a schema node carries no example of its own.
pub fn default_example(type_or_format: &str) -> Option<Value> {
    let value = match type_or_format {
        "boolean" => json!(true),
        "integer" => json!(42),
        "number" => json!(42.0),
        "string" => json!("example"),
        "date" => json!("2015-01-01"),
        "date-time" => json!("2015-01-01T12:00:00Z"),
        "email" => json!("username@example.com"),
        "hostname" => json!("example.com"),
        "ipv4" => json!("192.0.2.1"),
        "ipv6" => json!("2001:DB8::1"),
        "uri" => json!("http://example.com"),
        "uuid" => json!("01234567-89ab-cdef-0123-456789abcdef"),
        _ => return None,
    };
    Some(value)
}

/// Render a value as an inline code literal (`` `"value"` ``).
pub fn code_literal(value: &Value) -> String {
    format!("`{}`", value)
}

/// One flattened, documentable property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// `:` joins nested objects, `/` joins array items, `[TAG].` marks a `oneOf` branch.
    pub path: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
    pub example: Option<String>,
    /// Canonical reference the property was resolved through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Another top-level resource this attribute points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_resource: Option<String>,
}

impl Attribute {
    pub fn new(
        path: impl Into<String>,
        type_name: impl Into<String>,
        description: impl Into<String>,
        example: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            type_name: type_name.into(),
            description: description.into(),
            example,
            reference: None,
            linked_resource: None,
        }
    }

    /// Prepend `prefix` to this attribute's path.
    pub(crate) fn nest_under(mut self, prefix: &str) -> Self {
        self.path = format!("{}{}", prefix, self.path);
        self
    }
}

/// A synthesized HTTP request for a link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestExample {
    pub method: String,
    /// Link path with placeholders replaced by `$UPPER_CASE` tokens.
    pub path: String,
    /// `path` prefixed with the document's base href.
    pub url: String,
    /// Rendered request body, non-GET only.
    pub body: Option<String>,
    /// `name=value` query parameters, GET only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
}

/// A synthesized HTTP response for a link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseExample {
    /// Status line, e.g. `HTTP/1.1 201 Created`.
    pub status_line: String,
    /// Code parsed from a supplied status line, else derived from `code`/`rel`.
    pub status: u16,
    pub body: Option<String>,
}

/// One resolved hypermedia action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkDescriptor {
    pub method: String,
    pub rel: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// The raw href template as declared.
    pub href: String,
    /// `href` with reference tokens replaced by `{readable_name}` placeholders.
    pub link_path: String,
    pub required_properties: Vec<Attribute>,
    pub optional_properties: Vec<Attribute>,
    pub example: RequestExample,
    pub response: ResponseExample,
}

/// A top-level resource with everything the renderer needs.
///
/// Borrows its schema node from the [`SchemaDocument`](crate::SchemaDocument).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResource<'a> {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Canonical reference the resource was declared through.
    pub reference: Option<String>,
    pub schema: &'a Value,
    pub attributes: Vec<Attribute>,
    pub links: Vec<LinkDescriptor>,
    /// Rendered example of the resource itself.
    pub example: Option<String>,
}

/// Resolved resources in document declaration order.
pub type ResolvedSchema<'a> = IndexMap<String, ResolvedResource<'a>>;

/// How example literals are serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Sort object keys lexicographically.
    pub sort_keys: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            sort_keys: true,
        }
    }
}

/// Options for schema resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// `Content-Type` for non-GET request examples.
    pub content_type: String,
    /// Extra headers for non-GET request examples, after `Content-Type`.
    pub http_headers: IndexMap<String, String>,
    pub format: FormatOptions,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            http_headers: IndexMap::new(),
            format: FormatOptions::default(),
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content type for request examples.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Add a default header to request examples.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }

    /// Set how example literals are serialized.
    pub fn format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }
}
