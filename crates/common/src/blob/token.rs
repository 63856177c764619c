use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::OffsetDateTime;

use super::events::OnUploadCompleted;

type HmacSha256 = Hmac<Sha256>;

pub const CLIENT_TOKEN_PREFIX: &str = "vercel_blob_client_";

/// How long an issued client token stays valid
pub const DEFAULT_TOKEN_VALIDITY: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("read-write token is empty")]
    Missing,
    #[error("malformed read-write token: no store id")]
    MissingStoreId,
    #[error("malformed client token: {0}")]
    MalformedClientToken(String),
    #[error("client token signature mismatch")]
    BadSignature,
    #[error("client token expired")]
    Expired,
    #[error("invalid signing key")]
    InvalidKey,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The server-side secret of a blob store, `vercel_blob_rw_<storeId>_<secret>`.
#[derive(Clone, PartialEq, Eq)]
pub struct ReadWriteToken {
    token: String,
    store_id: String,
}

impl fmt::Debug for ReadWriteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadWriteToken")
            .field("store_id", &self.store_id)
            .finish_non_exhaustive()
    }
}

impl ReadWriteToken {
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let store_id = token
            .split('_')
            .nth(3)
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingStoreId)?;

        Ok(Self {
            store_id: store_id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn expose_secret(&self) -> &str {
        &self.token
    }
}

/// Policy embedded in (and enforced through) a client token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenOptions {
    pub pathname: String,
    pub allowed_content_types: Vec<String>,
    pub maximum_size_in_bytes: u64,
    /// Unix timestamp, milliseconds
    pub valid_until: i64,
    pub add_random_suffix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_upload_completed: Option<OnUploadCompleted>,
}

impl ClientTokenOptions {
    pub fn new(pathname: impl Into<String>, maximum_size_in_bytes: u64) -> Self {
        let valid_until = OffsetDateTime::now_utc() + DEFAULT_TOKEN_VALIDITY;
        Self {
            pathname: pathname.into(),
            allowed_content_types: vec!["*/*".to_string()],
            maximum_size_in_bytes,
            valid_until: (valid_until.unix_timestamp_nanos() / 1_000_000) as i64,
            add_random_suffix: true,
            on_upload_completed: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        now_ms > self.valid_until
    }
}

/// Hex HMAC-SHA256 of `payload`, keyed by the read-write token
pub fn sign_payload(payload: &[u8], key: &ReadWriteToken) -> Result<String, TokenError> {
    let mut mac = HmacSha256::new_from_slice(key.expose_secret().as_bytes())
        .map_err(|_| TokenError::InvalidKey)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature produced by [`sign_payload`]
pub fn verify_signature(
    payload: &[u8],
    signature: &str,
    key: &ReadWriteToken,
) -> Result<(), TokenError> {
    let expected = hex::decode(signature.trim()).map_err(|_| TokenError::BadSignature)?;
    let mut mac = HmacSha256::new_from_slice(key.expose_secret().as_bytes())
        .map_err(|_| TokenError::InvalidKey)?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| TokenError::BadSignature)
}

/// Issue a client token:
/// `vercel_blob_client_<storeId>_` + base64(`<signature>.<base64 policy>`)
pub fn generate_client_token(
    key: &ReadWriteToken,
    options: &ClientTokenOptions,
) -> Result<String, TokenError> {
    let payload = STANDARD.encode(serde_json::to_vec(options)?);
    let signature = sign_payload(payload.as_bytes(), key)?;
    let secured = STANDARD.encode(format!("{}.{}", signature, payload));

    Ok(format!("{}{}_{}", CLIENT_TOKEN_PREFIX, key.store_id(), secured))
}

/// Check a client token against the store's read-write token and return the
/// policy it carries.
pub fn verify_client_token(
    key: &ReadWriteToken,
    client_token: &str,
) -> Result<ClientTokenOptions, TokenError> {
    let rest = client_token
        .strip_prefix(CLIENT_TOKEN_PREFIX)
        .ok_or_else(|| TokenError::MalformedClientToken("missing prefix".into()))?;
    let (store_id, secured) = rest
        .split_once('_')
        .ok_or_else(|| TokenError::MalformedClientToken("missing store id".into()))?;
    if store_id != key.store_id() {
        return Err(TokenError::MalformedClientToken("store id mismatch".into()));
    }

    let decoded = STANDARD
        .decode(secured)
        .map_err(|e| TokenError::MalformedClientToken(e.to_string()))?;
    let decoded =
        String::from_utf8(decoded).map_err(|e| TokenError::MalformedClientToken(e.to_string()))?;
    let (signature, payload) = decoded
        .split_once('.')
        .ok_or_else(|| TokenError::MalformedClientToken("missing signature".into()))?;

    verify_signature(payload.as_bytes(), signature, key)?;

    let policy = STANDARD
        .decode(payload)
        .map_err(|e| TokenError::MalformedClientToken(e.to_string()))?;
    let options: ClientTokenOptions = serde_json::from_slice(&policy)?;
    if options.is_expired() {
        return Err(TokenError::Expired);
    }

    Ok(options)
}
