use axum::http::HeaderMap;

use crate::auth::{DevTokens, Identity, TokenError};

/// Bearer token from the Authorization header, if one was sent
pub fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Play the upstream authorizer: verify the bearer token, if any, and
/// resolve the identity it carries.
pub fn resolve_identity(headers: &HeaderMap, tokens: &DevTokens) -> Result<Option<Identity>, String> {
    let Some(token) = extract_bearer(headers)? else {
        return Ok(None);
    };
    let claims = tokens.verify(&token).map_err(|e| match e {
        TokenError::Invalid(reason) => format!("invalid bearer token ({})", reason),
        other => other.to_string(),
    })?;
    Ok(Identity::from_claims(&claims.identity))
}
