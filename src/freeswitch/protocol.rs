//! Event Socket Framing
//!
//! Every message from FreeSWITCH starts with a mail-style header block: `Name: value`
//! lines terminated by an empty line. Replies that carry a payload declare its size in
//! `Content-Length`, and exactly that many bytes follow the header block.
//!
//! Commands go the other way as plain text terminated by a blank line (`"\n\n"`).

use crate::error::{ExporterError, Result};
use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const REPLY_TEXT: &str = "Reply-Text";

pub const AUTH_REQUEST: &str = "auth/request";
pub const COMMAND_REPLY: &str = "command/reply";
pub const AUTH_ACCEPTED: &str = "+OK accepted";

/// Header block of one event socket message, keyed case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    values: HashMap<String, String>,
}

impl Headers {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Declared body length, if any
    pub fn content_length(&self) -> Result<Option<usize>> {
        match self.get(CONTENT_LENGTH) {
            None | Some("") => Ok(None),
            Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|e| {
                ExporterError::HeaderParse(format!("invalid {} '{}': {}", CONTENT_LENGTH, raw, e))
            }),
        }
    }
}

/// Reads one header block up to and including its terminating empty line.
///
/// Lines may end in `\n` or `\r\n`. A line starting with a space or tab continues the
/// previous header's value.
pub async fn read_headers<R>(reader: &mut R) -> Result<Headers>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Headers::default();
    let mut last_key: Option<String> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| ExporterError::HeaderParse(e.to_string()))?;

        if read == 0 {
            return Err(ExporterError::HeaderParse(
                "connection closed before end of header block".to_string(),
            ));
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Ok(headers);
        }

        if trimmed.starts_with([' ', '\t']) {
            let key = last_key.as_ref().ok_or_else(|| {
                ExporterError::HeaderParse(format!("malformed header line: {:?}", trimmed))
            })?;
            let entry = headers.values.entry(key.clone()).or_default();
            entry.push(' ');
            entry.push_str(trimmed.trim());
            continue;
        }

        let (name, value) = trimmed.split_once(':').ok_or_else(|| {
            ExporterError::HeaderParse(format!("malformed header line: {:?}", trimmed))
        })?;

        let key = name.trim().to_ascii_lowercase();
        headers.values.insert(key.clone(), value.trim().to_string());
        last_key = Some(key);
    }
}

/// Upper bound on the buffer reserved up front; the declared length comes from the peer
pub const MAX_BODY_PREALLOCATION: usize = 64 * 1024;

/// Buffer for a body of `length` declared bytes
pub fn body_buffer(length: usize) -> Vec<u8> {
    Vec::with_capacity(length.min(MAX_BODY_PREALLOCATION))
}

/// Reads exactly `length` bytes of body, never more.
pub async fn read_body<R>(reader: &mut R, length: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut body = body_buffer(length);
    read_body_into(reader, length, &mut body).await?;
    Ok(body)
}

/// Appends exactly `length` bytes of body to `body`.
///
/// Bytes arrive in `body` as they are read, so a caller that abandons the read can still
/// see how much came in.
pub async fn read_body_into<R>(
    reader: &mut R,
    length: usize,
    body: &mut Vec<u8>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let start = body.len();
    let result = reader.take(length as u64).read_to_end(body).await;

    match result {
        Ok(received) if received == length => Ok(()),
        Ok(received) => Err(ExporterError::ShortRead {
            expected: length,
            received,
        }),
        Err(_) => Err(ExporterError::ShortRead {
            expected: length,
            received: body.len() - start,
        }),
    }
}

/// Wire form of a command: the text followed by the blank-line terminator
pub fn frame_command(command: &str) -> String {
    format!("{}\n\n", command)
}
