use bytes::Bytes;
use http::header::HeaderName;
use http::HeaderValue;
use http::Method;

use crate::Error;
use crate::Result;

/// FileObject identifies exactly one storage object, optionally carrying
/// the content to upload.
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct FileObject {
    bucket: String,
    key: String,
    content: Option<Bytes>,
}

impl FileObject {
    /// Create a new FileObject for the given bucket and object key.
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content: None,
        }
    }

    /// Attach the content to upload.
    pub fn with_content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// The bucket holding this object.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The object key within the bucket.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The content to upload, if any.
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }
}

/// A not-yet-executed request against the storage service.
///
/// Each variant carries only the fields valid for its method, so invariants
/// like "content is present only for put" hold by construction. An external
/// executor consumes an Operation exactly once: it issues the method against
/// `https://{bucket}.{endpoint}/{key}`, attaches the headers verbatim and
/// streams the content as the body when present.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Upload an object.
    Put {
        /// Target bucket.
        bucket: String,
        /// Target object key.
        key: String,
        /// Content to upload.
        content: Bytes,
        /// Headers to send verbatim.
        headers: Vec<(HeaderName, HeaderValue)>,
    },
    /// Delete an object.
    Delete {
        /// Target bucket.
        bucket: String,
        /// Target object key.
        key: String,
        /// Headers to send verbatim.
        headers: Vec<(HeaderName, HeaderValue)>,
    },
    /// Probe an object's metadata.
    Head {
        /// Target bucket.
        bucket: String,
        /// Target object key.
        key: String,
    },
}

impl Operation {
    /// The HTTP method the executor must use.
    pub fn method(&self) -> Method {
        match self {
            Operation::Put { .. } => Method::PUT,
            Operation::Delete { .. } => Method::DELETE,
            Operation::Head { .. } => Method::HEAD,
        }
    }

    /// Target bucket.
    pub fn bucket(&self) -> &str {
        match self {
            Operation::Put { bucket, .. } => bucket,
            Operation::Delete { bucket, .. } => bucket,
            Operation::Head { bucket, .. } => bucket,
        }
    }

    /// Target object key.
    pub fn key(&self) -> &str {
        match self {
            Operation::Put { key, .. } => key,
            Operation::Delete { key, .. } => key,
            Operation::Head { key, .. } => key,
        }
    }

    /// Headers the executor must attach verbatim.
    pub fn headers(&self) -> &[(HeaderName, HeaderValue)] {
        match self {
            Operation::Put { headers, .. } => headers,
            Operation::Delete { headers, .. } => headers,
            Operation::Head { .. } => &[],
        }
    }

    /// The request body, present only for put.
    pub fn content(&self) -> Option<&Bytes> {
        match self {
            Operation::Put { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// Build a put Operation from a FileObject carrying content.
///
/// Fails with `InvalidArgument` if the FileObject has no content attached
/// or a header is not a valid name/value pair.
pub fn put_object(file_object: FileObject, headers: &[(String, String)]) -> Result<Operation> {
    let content = file_object
        .content
        .clone()
        .ok_or_else(|| Error::invalid_argument("put_object requires a content stream"))?;

    Ok(Operation::Put {
        bucket: file_object.bucket,
        key: file_object.key,
        content,
        headers: validate_headers(headers)?,
    })
}

/// Build a delete Operation. Any content on the FileObject is ignored.
pub fn delete_object(file_object: FileObject, headers: &[(String, String)]) -> Result<Operation> {
    Ok(Operation::Delete {
        bucket: file_object.bucket,
        key: file_object.key,
        headers: validate_headers(headers)?,
    })
}

/// Build a head Operation for probing an object.
///
/// Building the Operation never answers whether the object exists. That
/// answer belongs to the executor that runs it: a 200 response means the
/// object is present, a 404 means it is not.
pub fn head_object(bucket: &str, key: &str) -> Operation {
    Operation::Head {
        bucket: bucket.to_string(),
        key: key.to_string(),
    }
}

pub(crate) fn validate_headers(
    headers: &[(String, String)],
) -> Result<Vec<(HeaderName, HeaderValue)>> {
    headers
        .iter()
        .map(|(name, value)| {
            if value.contains('\n') || value.contains('\r') {
                return Err(Error::invalid_argument(format!(
                    "header {name} value must not contain newline"
                )));
            }
            Ok((
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            ))
        })
        .collect()
}
