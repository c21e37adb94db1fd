//! Message body: caller-supplied payload placed verbatim inside `<Body>`

use crate::error::{BuildError, BuildResult};
use quick_xml::Writer;
use std::borrow::Cow;
use std::fmt;

/// Payload accepted for `<Body>`
///
/// Only text or a streaming XML writer are representable; any other shape is
/// rejected by the type system at the call site.
pub enum MessageBody {
    /// Pre-rendered XML fragment (or a complete envelope for pass-through sends)
    Text(String),
    /// Writer the caller streamed a fragment into
    Writer(Writer<Vec<u8>>),
}

impl MessageBody {
    /// Render the payload as text
    pub fn as_text(&self) -> BuildResult<Cow<'_, str>> {
        match self {
            MessageBody::Text(text) => Ok(Cow::Borrowed(text.as_str())),
            MessageBody::Writer(writer) => std::str::from_utf8(writer.get_ref())
                .map(Cow::Borrowed)
                .map_err(|e| BuildError::BodyNotText {
                    reason: e.to_string(),
                }),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageBody::Text(text) => text.trim().is_empty(),
            MessageBody::Writer(writer) => writer.get_ref().is_empty(),
        }
    }
}

impl Default for MessageBody {
    fn default() -> Self {
        MessageBody::Text(String::new())
    }
}

impl fmt::Debug for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageBody::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            MessageBody::Writer(writer) => {
                f.debug_tuple("Writer").field(&writer.get_ref().len()).finish()
            }
        }
    }
}

impl From<String> for MessageBody {
    fn from(text: String) -> Self {
        MessageBody::Text(text)
    }
}

impl From<&str> for MessageBody {
    fn from(text: &str) -> Self {
        MessageBody::Text(text.to_string())
    }
}

impl From<Writer<Vec<u8>>> for MessageBody {
    fn from(writer: Writer<Vec<u8>>) -> Self {
        MessageBody::Writer(writer)
    }
}
