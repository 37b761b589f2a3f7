//! OAuth 1.0a request signing (HMAC-SHA1)

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use uuid::Uuid;

use crate::adapter::config::Credentials;
use crate::domain::errors::RemoteError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as they are
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE).to_string()
}

/// Signs requests with a fixed consumer/token pair
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: Credentials,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Adds the `oauth_*` parameters and the signature to `params`.
    ///
    /// Every non-file parameter of the request must be in `params`, whether
    /// it travels in the query string or in the body.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<Vec<(String, String)>, RemoteError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.sign_with(method, url, params, &nonce, &timestamp)
    }

    fn sign_with(
        &self,
        method: &str,
        url: &str,
        mut params: Vec<(String, String)>,
        nonce: &str,
        timestamp: &str,
    ) -> Result<Vec<(String, String)>, RemoteError> {
        let oauth = [
            ("oauth_consumer_key", self.credentials.api_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.oauth_token.as_str()),
            ("oauth_version", "1.0"),
        ];
        params.extend(oauth.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let base = signature_base_string(method, url, &params);
        let key = format!(
            "{}&{}",
            encode(&self.credentials.api_secret),
            encode(&self.credentials.oauth_token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| RemoteError::Fatal(format!("cannot create signing key: {}", e)))?;
        mac.update(base.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        params.push(("oauth_signature".to_string(), signature));
        Ok(params)
    }
}

/// `METHOD&url&sorted-params`, each part percent-encoded
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&normalized)
    )
}
