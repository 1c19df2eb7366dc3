use lambda_http::request::RequestContext;
use lambda_http::{Body, Request, RequestExt};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::auth::{Claims, Identity};
use crate::error::ApiError;
use crate::types::HttpMethod;

/// Resource path as sent by API Gateway, without the stage prefix
pub fn lambda_path(request: &Request) -> String {
    let raw = request.raw_http_path();
    if raw.is_empty() {
        request.uri().path().to_string()
    } else {
        raw.to_string()
    }
}

/// Identity from the REST authorizer's `claims` object, if any
fn authorizer_identity(request: &Request) -> Option<Identity> {
    let Some(RequestContext::ApiGatewayV1(context)) = request.request_context_ref() else {
        return None;
    };
    let claims = context.authorizer.fields.get("claims")?;
    Identity::from_claims(&Claims::from_value(claims))
}

/// Inbound request descriptor
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
    pub identity: Option<Identity>,
}

impl ApiRequest {
    pub fn new(method: impl Into<HttpMethod>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: HashMap::new(),
            body: None,
            identity: None,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Build from a Lambda proxy request. The runtime has already decoded
    /// base64 bodies; the first value of a repeated query parameter wins.
    pub fn from_lambda(request: &Request) -> Result<Self, ApiError> {
        let body = match request.body() {
            Body::Empty => None,
            Body::Text(text) => Some(text.clone()),
            Body::Binary(bytes) => Some(
                String::from_utf8(bytes.clone())
                    .map_err(|_| ApiError::bad_request("Request body is not valid UTF-8"))?,
            ),
        };

        let mut query = HashMap::new();
        if let Some(params) = request.query_string_parameters_ref() {
            for (name, value) in params.iter() {
                query
                    .entry(name.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }

        Ok(Self {
            method: HttpMethod::parse(request.method().as_str()),
            path: lambda_path(request),
            query,
            body,
            identity: authorizer_identity(request),
        })
    }

    /// Resolved identity or the unauthorized failure
    pub fn require_identity(&self) -> Result<&Identity, ApiError> {
        self.identity.as_ref().ok_or_else(ApiError::unauthorized)
    }

    /// Non-empty query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// JSON body as an object; an absent or blank body is an empty object
    pub fn json_body(&self) -> Result<Map<String, Value>, ApiError> {
        let raw = match self.body.as_deref().map(str::trim) {
            None | Some("") => return Ok(Map::new()),
            Some(raw) => raw,
        };
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }
}

/// String field of a JSON body. Absent and `null` both count as missing.
pub fn body_string<'a>(
    body: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ApiError::bad_request(format!(
            "Field '{}' must be a string",
            field
        ))),
    }
}
