//! Flickr wire formats
//!
//! REST replies are JSON (`format=json&nojsoncallback=1`), upload replies are XML.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::retry::classify_api_failure;
use crate::domain::errors::RemoteError;

/// Text node wrapper (`{"_content": "..."}`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Content {
    #[serde(rename = "_content", default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotosetListReply {
    pub photosets: PhotosetPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotosetPage {
    #[serde(default = "first_page", deserialize_with = "flexible_u32")]
    pub page: u32,
    #[serde(default = "first_page", deserialize_with = "flexible_u32")]
    pub pages: u32,
    #[serde(default)]
    pub photoset: Vec<PhotosetSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotosetSummary {
    pub id: String,
    pub title: Content,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhotosetReply {
    pub photoset: CreatedPhotoset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPhotoset {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotosetPhotosReply {
    pub photoset: PhotosetPhotos,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotosetPhotos {
    #[serde(default = "first_page", deserialize_with = "flexible_u32")]
    pub page: u32,
    #[serde(default = "first_page", deserialize_with = "flexible_u32")]
    pub pages: u32,
    #[serde(default)]
    pub photo: Vec<PhotoSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Reply of calls that return nothing but `stat`
#[derive(Debug, Clone, Deserialize)]
pub struct EmptyReply {}

fn first_page() -> u32 {
    1
}

/// Paging fields arrive as numbers from some methods and strings from others
fn flexible_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct Status {
    stat: String,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Parse a REST reply, turning `stat="fail"` into a classified error
pub fn parse_rest_reply<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RemoteError::Fatal(format!("malformed reply: {}", e)))?;
    let status: Status = serde_json::from_value(value.clone())
        .map_err(|e| RemoteError::Fatal(format!("reply without status: {}", e)))?;

    if status.stat != "ok" {
        return Err(classify_api_failure(status.code, &status.message));
    }

    serde_json::from_value(value)
        .map_err(|e| RemoteError::Fatal(format!("unexpected reply: {}", e)))
}

/// Parsed upload reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    Uploaded(String),
    Duplicate(String),
}

/// Parse the XML reply of the upload endpoint
///
/// ```text
/// <rsp stat="ok"><photoid>1234</photoid></rsp>
/// <rsp stat="ok"><photoid duplicate="1">1234</photoid></rsp>
/// <rsp stat="fail"><err code="3" msg="..."/><duplicate_photo_id>1234</duplicate_photo_id></rsp>
/// ```
pub fn parse_upload_reply(xml: &str) -> Result<UploadReply, RemoteError> {
    let malformed = |e: String| RemoteError::Fatal(format!("malformed upload reply: {}", e));

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stat: Option<String> = None;
    let mut photo_id: Option<String> = None;
    let mut duplicate = false;
    let mut duplicate_id: Option<String> = None;
    let mut failure: Option<(i64, String)> = None;
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                inspect_element(&e, &mut stat, &mut duplicate, &mut duplicate_id, &mut failure)
                    .map_err(malformed)?;
                current = Some(e.name().as_ref().to_vec());
            }
            Ok(Event::Empty(e)) => {
                inspect_element(&e, &mut stat, &mut duplicate, &mut duplicate_id, &mut failure)
                    .map_err(malformed)?;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| malformed(e.to_string()))?;
                match current.as_deref() {
                    Some(b"photoid") => photo_id = Some(text.into_owned()),
                    Some(b"duplicate_photo_id") => duplicate_id = Some(text.into_owned()),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if let Some(id) = duplicate_id.filter(|id| !id.is_empty()) {
        return Ok(UploadReply::Duplicate(id));
    }

    match stat.as_deref() {
        Some("ok") => match photo_id.filter(|id| !id.is_empty()) {
            Some(id) if duplicate => Ok(UploadReply::Duplicate(id)),
            Some(id) => Ok(UploadReply::Uploaded(id)),
            None => Err(RemoteError::Fatal(
                "upload reply has no photo ID".to_string(),
            )),
        },
        Some(_) => {
            let (code, message) = failure.unwrap_or((0, "upload failed".to_string()));
            Err(classify_api_failure(code, &message))
        }
        None => Err(malformed("missing <rsp>".to_string())),
    }
}

fn inspect_element(
    e: &BytesStart<'_>,
    stat: &mut Option<String>,
    duplicate: &mut bool,
    duplicate_id: &mut Option<String>,
    failure: &mut Option<(i64, String)>,
) -> Result<(), String> {
    match e.name().as_ref() {
        b"rsp" => *stat = attribute(e, "stat")?,
        b"photoid" => {
            *duplicate = matches!(attribute(e, "duplicate")?.as_deref(), Some("1" | "true"));
        }
        b"err" => {
            let code = attribute(e, "code")?
                .and_then(|c| c.parse().ok())
                .unwrap_or_default();
            let message = attribute(e, "msg")?.unwrap_or_default();
            *failure = Some((code, message));
            if let Some(id) = attribute(e, "duplicate_photo_id")? {
                *duplicate_id = Some(id);
            }
        }
        b"duplicate_photo_id" => {
            if let Some(id) = attribute(e, "id")? {
                *duplicate_id = Some(id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, String> {
    match e.try_get_attribute(name).map_err(|e| e.to_string())? {
        Some(attr) => Ok(Some(
            attr.unescape_value()
                .map_err(|e| e.to_string())?
                .into_owned(),
        )),
        None => Ok(None),
    }
}
