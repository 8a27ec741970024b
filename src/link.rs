//! Link processing - resolves one hyper-schema link into a [`LinkDescriptor`].

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::{json, Value};

use crate::document::{definition_name, last_segment, ref_of, SchemaDocument};
use crate::error::ResolveError;
use crate::example::{render, synthesize};
use crate::flatten::flatten_entries;
use crate::node::Node;
use crate::types::{LinkDescriptor, RequestExample, ResolveOptions, ResponseExample};

/// Named parameters of a link body schema, borrowed from the document.
pub type Parameters<'a> = Vec<(String, &'a Value)>;

/// `{(#/definitions/post/definitions/identity)}`, possibly percent-encoded.
fn reference_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\{\([^)]+\)\}").expect("reference token pattern is valid"))
}

/// `{post_id}` placeholders in a resolved link path.
fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("placeholder pattern is valid"))
}

/// Processes the links of a single resource.
#[derive(Debug, Clone, Copy)]
pub struct LinkProcessor<'a> {
    doc: &'a SchemaDocument,
    options: &'a ResolveOptions,
    resource_example: Option<&'a Value>,
}

impl<'a> LinkProcessor<'a> {
    /// `resource_example` is the resource's own synthesized example, used for
    /// responses without a `targetSchema`.
    pub fn new(
        doc: &'a SchemaDocument,
        options: &'a ResolveOptions,
        resource_example: Option<&'a Value>,
    ) -> Self {
        Self {
            doc,
            options,
            resource_example,
        }
    }

    /// Resolve the link at position `index` of a resource's `links`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedLink` when `method` or `href` is missing, and
    /// propagates reference errors from the href, body schema, or target schema.
    pub fn process(&self, index: usize, link: &'a Value) -> Result<LinkDescriptor, ResolveError> {
        let link = Node(link);
        let method = link.str_field("method").ok_or(ResolveError::MalformedLink {
            index,
            field: "method",
        })?;
        let href = link.str_field("href").ok_or(ResolveError::MalformedLink {
            index,
            field: "href",
        })?;

        let link_path = self.link_path(href)?;

        let (required_properties, optional_properties) = match link.get("schema") {
            Some(schema) => {
                let (required, optional) = self.split_parameters(schema)?;
                (
                    flatten_entries(self.doc, borrow_names(&required))?,
                    flatten_entries(self.doc, borrow_names(&optional))?,
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        Ok(LinkDescriptor {
            method: method.to_string(),
            rel: link.str_field("rel").map(str::to_string),
            title: link.str_field("title").map(str::to_string),
            description: link.description().map(str::to_string),
            href: href.to_string(),
            example: self.request_example(method, link, &link_path)?,
            response: self.response_example(link)?,
            link_path,
            required_properties,
            optional_properties,
        })
    }

    /// Replace every reference token in `href` with a readable placeholder.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvableReference` if a token names a missing node.
    pub fn link_path(&self, href: &str) -> Result<String, ResolveError> {
        let mut path = String::with_capacity(href.len());
        let mut last = 0;
        for token in reference_token().find_iter(href) {
            path.push_str(&href[last..token.start()]);
            path.push('{');
            path.push_str(&self.placeholder_name(token.as_str())?);
            path.push('}');
            last = token.end();
        }
        path.push_str(&href[last..]);
        Ok(path)
    }

    /// `post_id` for `{(#/definitions/post/definitions/id)}`; a union target
    /// joins its branch names: `post_id_or_slug`.
    fn placeholder_name(&self, token: &str) -> Result<String, ResolveError> {
        let reference = token_reference(token);
        let owner = definition_name(&reference)
            .unwrap_or_default()
            .replace('-', "_");

        let resolved = self.doc.resolve_ref(&reference)?;
        let target = match Node(resolved.node).any_of() {
            Some(branches) => branches
                .iter()
                .enumerate()
                .map(|(i, branch)| match ref_of(branch) {
                    Some(r) => last_segment(r).to_string(),
                    None => i.to_string(),
                })
                .collect::<Vec<_>>()
                .join("_or_"),
            None => last_segment(resolved.reference.unwrap_or(&reference)).to_string(),
        };

        if owner.is_empty() {
            Ok(target)
        } else {
            Ok(format!("{}_{}", owner, target))
        }
    }

    /// Partition a body schema's leaf properties by its `required` lists.
    ///
    /// Inline nested objects are descended into, joining names with `:`;
    /// each leaf is decided by its own parent's `required` list.
    pub fn split_parameters(
        &self,
        schema: &'a Value,
    ) -> Result<(Parameters<'a>, Parameters<'a>), ResolveError> {
        let schema = Node(self.doc.dereference(schema)?.node);
        let mut required = Vec::new();
        let mut optional = Vec::new();
        collect_parameters(schema, None, &mut required, &mut optional);
        Ok((required, optional))
    }

    fn request_example(
        &self,
        method: &str,
        link: Node<'a>,
        link_path: &str,
    ) -> Result<RequestExample, ResolveError> {
        let path = placeholder()
            .replace_all(link_path, |caps: &Captures| format!("${}", caps[1].to_uppercase()))
            .into_owned();
        let is_get = method.eq_ignore_ascii_case("GET");

        let data = match link.get("schema") {
            Some(schema) => synthesize(self.doc, schema)?,
            None => None,
        }
        .filter(|data| !is_empty_literal(data));

        let (body, query) = match data {
            Some(data) if is_get => (None, query_params(&data, None)),
            Some(data) => (Some(render(&data, &self.options.format)), Vec::new()),
            None => (None, Vec::new()),
        };

        let mut headers = IndexMap::new();
        if !is_get {
            headers.insert("Content-Type".to_string(), self.options.content_type.clone());
            for (name, value) in &self.options.http_headers {
                headers.insert(name.clone(), value.clone());
            }
        }

        Ok(RequestExample {
            method: method.to_uppercase(),
            url: format!("{}{}", self.doc.base_href(), path),
            path,
            body,
            query,
            headers,
        })
    }

    fn response_example(&self, link: Node<'a>) -> Result<ResponseExample, ResolveError> {
        let supplied = link.get("response_example");
        let head = supplied.and_then(|r| r.get("head")).and_then(Value::as_str);
        let status = head
            .and_then(status_from_head)
            .unwrap_or_else(|| status_code(link));

        let status_line = match head {
            Some(head) => head.to_string(),
            None => format!("HTTP/1.1 {} {}", status, reason_phrase(status)),
        };

        let body = match supplied.and_then(|r| r.get("body")).filter(|b| !b.is_null()) {
            Some(Value::String(body)) => Some(body.clone()),
            Some(body) => Some(render(body, &self.options.format)),
            None => self.synthesized_response_body(link, status)?,
        };

        Ok(ResponseExample {
            status_line,
            status,
            body,
        })
    }

    fn synthesized_response_body(
        &self,
        link: Node<'a>,
        status: u16,
    ) -> Result<Option<String>, ResolveError> {
        let format = &self.options.format;

        if let Some(target) = link.get("targetSchema") {
            return Ok(synthesize(self.doc, target)?.map(|v| render(&v, format)));
        }

        if link.str_field("rel") == Some("instances") {
            let element = self.resource_example.cloned().unwrap_or(Value::Null);
            return Ok(Some(render(&json!([element]), format)));
        }

        if status == 204 {
            return Ok(None);
        }

        Ok(self.resource_example.map(|v| render(v, format)))
    }
}

/// Decoded references of every `{(...)}` token in an href.
pub(crate) fn href_references(href: &str) -> impl Iterator<Item = String> + '_ {
    reference_token()
        .find_iter(href)
        .map(|token| token_reference(token.as_str()))
}

fn token_reference(token: &str) -> String {
    token
        .replace("%2F", "/")
        .replace("%23", "#")
        .replace(['{', '(', ')', '}'], "")
}

fn borrow_names<'p>(
    parameters: &'p [(String, &'p Value)],
) -> impl Iterator<Item = (&'p str, &'p Value)> {
    parameters.iter().map(|(name, value)| (name.as_str(), *value))
}

fn collect_parameters<'a>(
    object: Node<'a>,
    prefix: Option<&str>,
    required: &mut Parameters<'a>,
    optional: &mut Parameters<'a>,
) {
    let Some(properties) = object.properties() else {
        return;
    };
    let required_names = object.required();

    for (name, property) in properties {
        let path = match prefix {
            Some(prefix) => format!("{}:{}", prefix, name),
            None => name.clone(),
        };
        let property_node = Node(property);
        if property_node.properties().is_some() {
            collect_parameters(property_node, Some(&path), required, optional);
        } else if required_names.contains(&name.as_str()) {
            required.push((path, property));
        } else {
            optional.push((path, property));
        }
    }
}

/// Response status from an explicit `code`, else from `rel`.
pub fn status_code(link: Node<'_>) -> u16 {
    match link.get("code").and_then(Value::as_u64) {
        Some(200) => 200,
        Some(201) => 201,
        Some(202) => 202,
        Some(204) => 204,
        _ => match link.str_field("rel") {
            Some("create") => 201,
            Some("destroy") => 204,
            _ => 200,
        },
    }
}

/// `299` from `HTTP/1.1 299 Custom`.
fn status_from_head(head: &str) -> Option<u16> {
    head.split_whitespace().nth(1)?.parse().ok()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        _ => "OK",
    }
}

fn is_empty_literal(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// `name=value` pairs; nested objects become `parent[child]`, arrays `name[]`.
fn query_params(value: &Value, prefix: Option<&str>) -> Vec<String> {
    let Value::Object(map) = value else {
        return Vec::new();
    };

    let mut params = Vec::new();
    for (key, value) in map {
        let name = match prefix {
            Some(prefix) => format!("{}[{}]", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(_) => params.extend(query_params(value, Some(&name))),
            Value::Array(items) => {
                for item in items {
                    params.push(format!("{}[]={}", name, query_value(item)));
                }
            }
            other => params.push(format!("{}={}", name, query_value(other))),
        }
    }
    params
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
