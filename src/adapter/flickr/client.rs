//! Flickr HTTP Client
//!
//! Signed REST calls and multipart uploads over a shared `reqwest::Client`.

use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::fs::File;

use super::models::{parse_rest_reply, parse_upload_reply, UploadReply};
use super::oauth::OAuthSigner;
use super::retry::{classify_status, classify_transport};
use crate::adapter::config::Credentials;
use crate::domain::errors::RemoteError;

pub const REST_URL: &str = "https://api.flickr.com/services/rest/";
pub const UPLOAD_URL: &str = "https://up.flickr.com/services/upload/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REST_TIMEOUT: Duration = Duration::from_secs(60);

/// Flickr API client
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FlickrClient {
    http: Client,
    signer: OAuthSigner,
    rest_url: String,
    upload_url: String,
}

impl FlickrClient {
    /// Create a client talking to the public Flickr endpoints
    pub fn new(credentials: Credentials) -> Result<Self, RemoteError> {
        Self::with_endpoints(credentials, REST_URL, UPLOAD_URL)
    }

    /// Create a client against custom endpoints
    pub fn with_endpoints(
        credentials: Credentials,
        rest_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Fatal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            signer: OAuthSigner::new(credentials),
            rest_url: rest_url.into(),
            upload_url: upload_url.into(),
        })
    }

    /// Call a REST method and decode its JSON reply
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let mut all: Vec<(String, String)> = vec![
            ("method".to_string(), method.to_string()),
            ("format".to_string(), "json".to_string()),
            ("nojsoncallback".to_string(), "1".to_string()),
        ];
        all.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let signed = self.signer.sign("POST", &self.rest_url, all)?;

        debug!("Calling {} {:?}", method, params);
        let response = self
            .http
            .post(&self.rest_url)
            .timeout(REST_TIMEOUT)
            .form(&signed)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        parse_rest_reply(&body)
    }

    /// Upload a file opened by the caller
    ///
    /// The file is streamed into the request body and dropped with it.
    pub async fn upload(
        &self,
        title: &str,
        file_name: &str,
        dedup: bool,
        media: File,
    ) -> Result<UploadReply, RemoteError> {
        let mut params = vec![("title".to_string(), title.to_string())];
        if dedup {
            // 1 は削除済みの写真も重複と判定するため 2 を使う
            params.push(("dedup_check".to_string(), "2".to_string()));
        }
        let signed = self.signer.sign("POST", &self.upload_url, params)?;

        let length = media
            .metadata()
            .await
            .map_err(|e| RemoteError::Fatal(format!("cannot stat '{}': {}", file_name, e)))?
            .len();
        let photo = Part::stream_with_length(Body::from(media), length)
            .file_name(file_name.to_string());

        let form = signed
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .part("photo", photo);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        debug!("Upload reply for '{}': {}", file_name, body.trim());
        parse_upload_reply(&body)
    }
}
