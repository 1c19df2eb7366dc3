use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity claims attached by the upstream authorizer.
/// API Gateway forwards every Cognito claim as a string, timestamps included,
/// so only the identity fields are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "cognito:username", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Read from a raw authorizer claims object; non-string values are ignored
    pub fn from_value(value: &Value) -> Self {
        let claim = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            sub: claim("sub"),
            username: claim("cognito:username"),
            email: claim("email"),
        }
    }
}

/// Payload of a development bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevClaims {
    #[serde(flatten)]
    pub identity: Claims,
    pub exp: i64,
    pub iat: i64,
}

/// Resolved caller identity, scoped to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
            email: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Claims without a non-empty subject resolve to no identity
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let user_id = claims.sub.as_deref().filter(|sub| !sub.is_empty())?;
        Some(Self {
            user_id: user_id.to_string(),
            username: claims.username.clone().filter(|name| !name.is_empty()),
            email: claims.email.clone().filter(|email| !email.is_empty()),
        })
    }

    /// Display name, falling back to the subject id
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Development token secret is not configured")]
    MissingSecret,

    #[error("Token generation failed: {0}")]
    Generation(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// HS256 tokens standing in for the upstream authorizer during local runs
#[derive(Clone)]
pub struct DevTokens {
    secret: String,
    expiry_hours: u64,
}

impl DevTokens {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn issue(
        &self,
        user_id: &str,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let now = Utc::now();
        let claims = DevClaims {
            identity: Claims {
                sub: Some(user_id.to_string()),
                username: username.map(str::to_string),
                email: email.map(str::to_string),
            },
            exp: (now + Duration::hours(self.expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Generation(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<DevClaims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let data = decode::<DevClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for DevTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevTokens")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}
