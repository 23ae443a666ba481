//! Upload callback encoding.

use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use serde::Serialize;

use crate::hash::base64_encode;
use crate::Error;
use crate::Result;

/// Characters that are unsafe inside an HTTP header value.
const HEADER_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A post-upload callback descriptor.
///
/// After a successful upload the service sends `body` to `url` and forwards
/// the endpoint's answer to the uploader. A Callback is consumed once by
/// [`Callback::encode`] and never mutated.
#[derive(Debug, Clone)]
pub struct Callback {
    url: String,
    body: serde_json::Value,
    body_type: String,
}

#[derive(Serialize)]
struct CallbackEnvelope<'a> {
    #[serde(rename = "callbackUrl")]
    url: String,
    #[serde(rename = "callbackBody")]
    body: String,
    #[serde(rename = "callbackBodyType")]
    body_type: &'a str,
}

impl Callback {
    /// Create a callback towards `url` carrying `body`.
    ///
    /// The body type defaults to `application/json`, the only supported one.
    pub fn new(url: &str, body: serde_json::Value) -> Self {
        Self {
            url: url.to_string(),
            body,
            body_type: "application/json".to_string(),
        }
    }

    /// Override the body type.
    ///
    /// Only `application/json` is implemented; [`Callback::encode`] fails
    /// with `UnsupportedBodyType` for anything else.
    pub fn with_body_type(mut self, body_type: &str) -> Self {
        self.body_type = body_type.to_string();
        self
    }

    /// Encode this callback into the opaque base64 value the service
    /// expects as the `callback` form field or request header.
    ///
    /// Pure and deterministic; performs no I/O.
    pub fn encode(&self) -> Result<String> {
        if self.body_type != "application/json" {
            return Err(Error::unsupported_body_type(format!(
                "callback body type {} is not supported",
                self.body_type
            )));
        }
        if !self.body.is_object() {
            return Err(Error::unsupported_body_type(
                "callback body must be a JSON object under application/json",
            ));
        }

        let envelope = CallbackEnvelope {
            url: utf8_percent_encode(&self.url, HEADER_UNSAFE).to_string(),
            body: serde_json::to_string(&self.body)?,
            body_type: &self.body_type,
        };

        Ok(base64_encode(serde_json::to_string(&envelope)?.as_bytes()))
    }
}
