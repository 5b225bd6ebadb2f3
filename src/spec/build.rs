use super::types::{ParameterLocation, ParameterMeta, ParameterStyle, RouteMeta};
use super::SecurityScheme;
use oas3::spec::{ObjectOrReference, Parameter};
use oas3::OpenApiV3Spec;
use serde_json::Value;
use tracing::warn;

/// A problem found while indexing the specification.
///
/// Issues are collected during [`build_routes`] and turned into a single
/// construction error; a malformed spec must stop the middleware from being
/// built, with the host application deciding whether to abort startup.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Convert collected issues into an error, or pass when there are none.
pub fn fail_if_issues(issues: Vec<ValidationIssue>) -> anyhow::Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    let mut out = format!("OpenAPI spec validation failed, {} issue(s) found:", issues.len());
    for issue in &issues {
        out.push_str(&format!("\n[{}] {}: {}", issue.kind, issue.location, issue.message));
    }
    Err(anyhow::anyhow!(out))
}

/// Resolve a JSON Schema `$ref` like `#/components/schemas/Pet` to the
/// actual schema definition.
pub fn resolve_schema_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::ObjectSchema> {
    if let Some(name) = ref_path.strip_prefix("#/components/schemas/") {
        spec.components
            .as_ref()?
            .schemas
            .get(name)
            .and_then(|schema_ref| match schema_ref {
                ObjectOrReference::Object(schema) => Some(schema),
                _ => None,
            })
    } else {
        None
    }
}

/// Expand `$ref` references in a schema value so compiled validators are
/// self-contained.
///
/// Recursive schemas (`Node.child → #/components/schemas/Node`) cannot be
/// fully inlined: a `$ref` whose expansion is already in progress is left in
/// place, and the document's component schemas are embedded into the value
/// afterwards so the remaining pointers resolve within the compiled schema
/// itself.
pub fn expand_schema_refs(spec: &OpenApiV3Spec, value: &mut Value) {
    let mut in_progress = Vec::new();
    expand_refs(spec, value, &mut in_progress);
    if contains_ref(value) {
        embed_component_schemas(spec, value);
    }
}

fn expand_refs(spec: &OpenApiV3Spec, value: &mut Value, in_progress: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            let ref_path = obj
                .get("$ref")
                .and_then(|v| v.as_str())
                .map(str::to_owned);
            if let Some(ref_path) = ref_path {
                // Cycle: keep the pointer, resolved later against the
                // embedded components.
                if in_progress.contains(&ref_path) {
                    return;
                }
                if let Some(schema) = resolve_schema_ref(spec, &ref_path) {
                    if let Ok(mut new_val) = serde_json::to_value(schema) {
                        in_progress.push(ref_path);
                        expand_refs(spec, &mut new_val, in_progress);
                        in_progress.pop();
                        *value = new_val;
                        return;
                    }
                }
            }
            for v in obj.values_mut() {
                expand_refs(spec, v, in_progress);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                expand_refs(spec, v, in_progress);
            }
        }
        _ => {}
    }
}

fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(obj) => {
            obj.get("$ref").is_some_and(Value::is_string) || obj.values().any(contains_ref)
        }
        Value::Array(arr) => arr.iter().any(contains_ref),
        _ => false,
    }
}

/// Copy `components.schemas` into the schema value so leftover
/// `#/components/schemas/...` pointers resolve against the value itself.
fn embed_component_schemas(spec: &OpenApiV3Spec, value: &mut Value) {
    let Some(components) = spec.components.as_ref() else {
        return;
    };
    let Ok(schemas) = serde_json::to_value(&components.schemas) else {
        return;
    };
    if let Value::Object(obj) = value {
        obj.insert(
            "components".to_string(),
            serde_json::json!({ "schemas": schemas }),
        );
    }
}

/// Extract the `application/json` request body schema from an operation.
///
/// Returns `(schema, required)`; the schema has its `$ref`s expanded.
pub fn extract_request_schema(
    spec: &OpenApiV3Spec,
    operation: &oas3::spec::Operation,
) -> (Option<Value>, bool) {
    let mut required = false;
    let mut schema = operation.request_body.as_ref().and_then(|r| match r {
        ObjectOrReference::Object(req_body) => {
            required = req_body.required.unwrap_or(false);
            req_body.content.get("application/json").and_then(|media| {
                match media.schema.as_ref()? {
                    ObjectOrReference::Object(schema_obj) => serde_json::to_value(schema_obj).ok(),
                    ObjectOrReference::Ref { ref_path, .. } => resolve_schema_ref(spec, ref_path)
                        .and_then(|s| serde_json::to_value(s).ok()),
                }
            })
        }
        _ => None,
    });
    if let Some(ref mut val) = schema {
        expand_schema_refs(spec, val);
    }
    (schema, required)
}

/// Extract all security schemes from `components.securitySchemes`.
pub fn extract_security_schemes(
    spec: &OpenApiV3Spec,
) -> std::collections::HashMap<String, SecurityScheme> {
    spec.components
        .as_ref()
        .map(|c| {
            c.security_schemes
                .iter()
                .filter_map(|(name, scheme)| match scheme {
                    ObjectOrReference::Object(obj) => Some((name.clone(), obj.clone())),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_parameter_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::Parameter> {
    if let Some(name) = ref_path.strip_prefix("#/components/parameters/") {
        spec.components
            .as_ref()?
            .parameters
            .get(name)
            .and_then(|param_ref| match param_ref {
                ObjectOrReference::Object(param) => Some(param),
                _ => None,
            })
    } else {
        None
    }
}

/// Extract parameter metadata, resolving `#/components/parameters/` refs.
pub fn extract_parameters(
    spec: &OpenApiV3Spec,
    params: &Vec<ObjectOrReference<Parameter>>,
) -> Vec<ParameterMeta> {
    let mut out = Vec::new();
    for p in params {
        let param = match p {
            ObjectOrReference::Object(obj) => Some(obj),
            ObjectOrReference::Ref { ref_path, .. } => resolve_parameter_ref(spec, ref_path),
        };

        if let Some(param) = param {
            let schema = param.schema.as_ref().and_then(|s| match s {
                ObjectOrReference::Object(obj) => serde_json::to_value(obj).ok(),
                ObjectOrReference::Ref { ref_path, .. } => resolve_schema_ref(spec, ref_path)
                    .and_then(|sch| serde_json::to_value(sch).ok()),
            });
            let schema = schema.map(|mut s| {
                expand_schema_refs(spec, &mut s);
                s
            });

            out.push(ParameterMeta {
                name: param.name.clone(),
                location: ParameterLocation::from(param.location.clone()),
                required: param.required.unwrap_or(false),
                schema,
                style: param.style.map(ParameterStyle::from),
                explode: param.explode,
            });
        }
    }
    out
}

/// Check a path template and its declared parameters for consistency.
fn lint_path_template(
    path: &str,
    parameters: &[ParameterMeta],
    location: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for segment in path.split('/') {
        let braced = segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2;
        if braced {
            let name = &segment[1..segment.len() - 1];
            if !parameters
                .iter()
                .any(|p| p.location == ParameterLocation::Path && p.name == name)
            {
                issues.push(ValidationIssue::new(
                    location,
                    "UndeclaredPathParameter",
                    format!("path template references {{{name}}} but no path parameter named \"{name}\" is declared"),
                ));
            }
        } else if segment.contains('{') || segment.contains('}') {
            issues.push(ValidationIssue::new(
                location,
                "MalformedPathTemplate",
                format!("segment \"{segment}\" has unbalanced braces"),
            ));
        }
    }
}

/// Build route metadata for every operation in the specification.
///
/// Security requirements are resolved here: an operation's own `security`
/// list when it declares one, falling back to the document-global list.
/// An empty result means security passes trivially for that operation.
pub fn build_routes(spec: &OpenApiV3Spec) -> anyhow::Result<Vec<RouteMeta>> {
    let mut routes = Vec::new();
    let mut issues = Vec::new();

    let base_path = if let Some(server) = spec.servers.first() {
        let url_str = &server.url;
        url::Url::parse(url_str)
            .or_else(|_| url::Url::parse(&format!("http://dummy{url_str}")))
            .map(|u| {
                let p = u.path().trim_end_matches('/');
                if p == "/" || p.is_empty() {
                    String::new()
                } else {
                    p.to_string()
                }
            })
            .unwrap_or_default()
    } else {
        String::new()
    };

    if let Some(paths_map) = spec.paths.as_ref() {
        for (path, item) in paths_map {
            for (method, operation) in item.methods() {
                let location = format!("{method} {path}");

                let (request_schema, request_body_required) =
                    extract_request_schema(spec, operation);

                if operation.request_body.is_some() && request_schema.is_none() {
                    // Non-JSON bodies are passed through unvalidated.
                    warn!(
                        operation = %location,
                        "request body declares no application/json schema, body validation skipped"
                    );
                }

                let security = if !operation.security.is_empty() {
                    operation.security.clone()
                } else {
                    spec.security.clone()
                };

                let mut parameters = Vec::new();
                parameters.extend(extract_parameters(spec, &item.parameters));
                parameters.extend(extract_parameters(spec, &operation.parameters));

                lint_path_template(path, &parameters, &location, &mut issues);

                routes.push(RouteMeta {
                    method: method.clone(),
                    path_pattern: path.clone(),
                    operation_id: operation.operation_id.clone(),
                    parameters,
                    request_schema,
                    request_body_required,
                    security,
                    base_path: base_path.clone(),
                });
            }
        }
    }

    fail_if_issues(issues)?;
    Ok(routes)
}
