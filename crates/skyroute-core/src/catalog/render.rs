//! Rendering operations into concrete requests.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::RoutingError;
use crate::request::RenderedRequest;
use crate::types::BaseUrl;

use super::descriptor::{
    ComputedValue, DefaultValue, Location, OperationDescriptor, ParamBinding, ParamKind,
};
use super::{Operation, Params};

/// Translates (resource, action, params) triples into [`RenderedRequest`]s.
///
/// Rendering is purely local: every [`RoutingError`] is raised before a
/// request exists, so invalid input never reaches the network.
#[derive(Debug, Clone, Default)]
pub struct Router {
    base_url: BaseUrl,
}

impl Router {
    pub fn new(base_url: BaseUrl) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Enumerate the catalog.
    pub fn list_operations(&self) -> &'static [Operation] {
        super::list_operations()
    }

    /// Render an operation identified by name.
    pub fn render(
        &self,
        resource: &str,
        action: &str,
        params: &Params,
    ) -> Result<RenderedRequest, RoutingError> {
        let op = Operation::parse(resource, action)?;
        self.render_operation(op, params)
    }

    /// Render an operation, stamping computed fields with the current time.
    pub fn render_operation(
        &self,
        op: Operation,
        params: &Params,
    ) -> Result<RenderedRequest, RoutingError> {
        self.render_at(op, params, Utc::now())
    }

    /// Render an operation with an explicit clock value.
    pub fn render_at(
        &self,
        op: Operation,
        params: &Params,
        now: DateTime<Utc>,
    ) -> Result<RenderedRequest, RoutingError> {
        render_descriptor(&self.base_url, op.descriptor(), params, now)
    }
}

/// A parameter value after defaults and type coercion.
#[derive(Debug, Clone, PartialEq)]
enum Resolved {
    Text(String),
    Integer(i64),
}

impl Resolved {
    fn into_string(self) -> String {
        match self {
            Resolved::Text(s) => s,
            Resolved::Integer(n) => n.to_string(),
        }
    }

    fn into_json(self) -> Value {
        match self {
            Resolved::Text(s) => Value::String(s),
            Resolved::Integer(n) => Value::from(n),
        }
    }
}

impl From<DefaultValue> for Resolved {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Integer(n) => Resolved::Integer(n),
            DefaultValue::Text(s) => Resolved::Text(s.to_string()),
        }
    }
}

pub(crate) fn render_descriptor(
    base_url: &BaseUrl,
    descriptor: &OperationDescriptor,
    params: &Params,
    now: DateTime<Utc>,
) -> Result<RenderedRequest, RoutingError> {
    let mut path = descriptor.path.to_string();
    let mut query = Vec::new();
    let mut body = Map::new();

    for binding in descriptor.params {
        let resolved = resolve(binding, params)?;

        match binding.location {
            Location::Path(token) => {
                // A path segment cannot be omitted, required or not.
                let value = resolved
                    .ok_or_else(|| RoutingError::MissingParameter(binding.name.to_string()))?;
                path = path.replace(&format!("{{{}}}", token), &value.into_string());
            }
            Location::Query(key) => {
                if let Some(value) = resolved {
                    let value = value.into_string();
                    if !value.is_empty() {
                        query.push((key, value));
                    }
                }
            }
            Location::Body(keys) => {
                if let Some(value) = resolved {
                    insert_at(&mut body, keys, value.into_json());
                }
            }
        }
    }

    for field in descriptor.computed {
        let value = match field.value {
            ComputedValue::Constant(s) => Value::String(s.to_string()),
            ComputedValue::Now => Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        insert_at(&mut body, field.path, value);
    }

    let mut request = RenderedRequest::new(descriptor.method, base_url.endpoint(&path));
    for (key, value) in query {
        request.push_query(key, value);
    }
    if descriptor.has_body() {
        request.set_body(Value::Object(body));
    }

    Ok(request)
}

fn resolve(binding: &ParamBinding, params: &Params) -> Result<Option<Resolved>, RoutingError> {
    let resolved = match params.get(binding.name) {
        Some(value) => Some(coerce(binding, value)?),
        None => binding.default.map(Resolved::from),
    };

    if resolved.is_none() && binding.required {
        return Err(RoutingError::MissingParameter(binding.name.to_string()));
    }

    Ok(resolved)
}

fn coerce(binding: &ParamBinding, value: &Value) -> Result<Resolved, RoutingError> {
    let invalid = |reason: String| RoutingError::InvalidValue {
        name: binding.name.to_string(),
        reason,
    };

    match binding.kind {
        ParamKind::Text => match value {
            Value::String(s) => Ok(Resolved::Text(s.clone())),
            Value::Number(n) => Ok(Resolved::Text(n.to_string())),
            Value::Bool(b) => Ok(Resolved::Text(b.to_string())),
            _ => Err(invalid("expected a string".to_string())),
        },
        ParamKind::Integer { min, max } => {
            let n = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| invalid("expected an integer".to_string()))?;

            if !(min..=max).contains(&n) {
                return Err(RoutingError::OutOfRange {
                    name: binding.name.to_string(),
                    value: n,
                    min,
                    max,
                });
            }
            Ok(Resolved::Integer(n))
        }
        ParamKind::Choice(choices) => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid("expected a string".to_string()))?;
            if choices.contains(&s) {
                Ok(Resolved::Text(s.to_string()))
            } else {
                Err(invalid(format!("expected one of {}", choices.join(", "))))
            }
        }
    }
}

fn insert_at(root: &mut Map<String, Value>, keys: &[&str], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut node = root;
    for key in parents {
        let entry = node
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = match entry {
            Value::Object(map) => map,
            _ => unreachable!("entry was just made an object"),
        };
    }
    node.insert(last.to_string(), value);
}
