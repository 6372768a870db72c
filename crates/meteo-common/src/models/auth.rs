use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// JWT claims
///
/// `scope` holds the granted scopes joined by single spaces (OAuth2 style).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Granted scopes as a set. Unknown scope names are kept verbatim.
    pub fn scopes(&self) -> HashSet<&str> {
        self.scope.split_whitespace().collect()
    }
}

/// Permission names a token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Read and update the caller's own profile.
    Me,
    /// Access the caller's items.
    Items,
    /// Query weather data.
    Weather,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Me, Scope::Items, Scope::Weather];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Me => "me",
            Scope::Items => "items",
            Scope::Weather => "weather",
        }
    }

    /// Join scopes the way they are stored in the `scope` claim.
    pub fn join(scopes: &[Scope]) -> String {
        scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a space-separated scope string, rejecting unknown names.
    pub fn parse_list(raw: &str) -> Result<Vec<Scope>, UnknownScope> {
        let mut scopes = Vec::new();
        for name in raw.split_whitespace() {
            let scope: Scope = name.parse()?;
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        Ok(scopes)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope '{0}'")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "me" => Ok(Scope::Me),
            "items" => Ok(Scope::Items),
            "weather" => Ok(Scope::Weather),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// OAuth2 token document returned by the form-based login endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
