//! Per-call OAuth2 credential handling.
//!
//! Callers pass their credentials as a JSON string inside every tool call.
//! The blob is parsed into an [`AuthClient`] which lives exactly as long as
//! the handler invocation that created it. No token refresh is attempted.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("malformed credentials: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Raw shape of the credential blob supplied with each tool call.
#[derive(Deserialize)]
struct CredentialBlob {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// OAuth2 client identity plus an optional session.
///
/// Without an access token the client is unauthenticated; requests made with
/// it carry no `Authorization` header and the remote service rejects them.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    tokens: Option<TokenPair>,
}

impl AuthClient {
    pub fn from_json(credentials: &str) -> Result<Self, CredentialError> {
        let blob: CredentialBlob = serde_json::from_str(credentials)?;

        let tokens = blob
            .access_token
            .filter(|token| !token.is_empty())
            .map(|access_token| TokenPair {
                access_token,
                refresh_token: blob.refresh_token,
            });

        Ok(Self {
            client_id: blob.client_id,
            client_secret: blob.client_secret,
            redirect_uri: blob.redirect_uri,
            tokens,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|pair| pair.access_token.as_str())
    }

    /// SHA-256 over identity and tokens. Two blobs that would produce the
    /// same outbound requests share a fingerprint.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for part in [
            self.client_id.as_str(),
            self.client_secret.as_str(),
            self.redirect_uri.as_str(),
            self.bearer_token().unwrap_or_default(),
            self.tokens
                .as_ref()
                .and_then(|pair| pair.refresh_token.as_deref())
                .unwrap_or_default(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.finalize().into()
    }
}

impl fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
