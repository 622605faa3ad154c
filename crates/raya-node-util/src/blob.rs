//! Blob and File
//!
//! Immutable byte containers with a MIME type. A blob's bytes are shared
//! between the blob and every slice taken from it.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use raya_node_sdk::{NodeError, NodeResult};

#[cfg(windows)]
const NATIVE_EOL: &str = "\r\n";
#[cfg(not(windows))]
const NATIVE_EOL: &str = "\n";

// ============================================================================
// Parts and options
// ============================================================================

/// One piece of blob content.
#[derive(Debug, Clone)]
pub enum BlobPart {
    /// Text, stored as UTF-8 (subject to line-ending conversion)
    Text(String),
    /// Raw bytes, copied as-is
    Bytes(Vec<u8>),
    /// Another blob's content
    Blob(Blob),
}

impl From<&str> for BlobPart {
    fn from(s: &str) -> Self {
        BlobPart::Text(s.to_string())
    }
}

impl From<String> for BlobPart {
    fn from(s: String) -> Self {
        BlobPart::Text(s)
    }
}

impl From<Vec<u8>> for BlobPart {
    fn from(bytes: Vec<u8>) -> Self {
        BlobPart::Bytes(bytes)
    }
}

impl From<&[u8]> for BlobPart {
    fn from(bytes: &[u8]) -> Self {
        BlobPart::Bytes(bytes.to_vec())
    }
}

impl From<Blob> for BlobPart {
    fn from(blob: Blob) -> Self {
        BlobPart::Blob(blob)
    }
}

impl From<File> for BlobPart {
    fn from(file: File) -> Self {
        BlobPart::Blob(file.blob)
    }
}

/// How line endings in text parts are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEndings {
    /// Keep text as given
    #[default]
    Transparent,
    /// Convert `\n` and `\r\n` to the platform line ending
    Native,
}

impl LineEndings {
    /// Parse the `endings` option value
    pub fn parse(value: &str) -> NodeResult<Self> {
        match value {
            "transparent" => Ok(LineEndings::Transparent),
            "native" => Ok(LineEndings::Native),
            other => Err(NodeError::InvalidArgValue {
                name: "options.endings".to_string(),
                reason: "must be one of: 'transparent', 'native'".to_string(),
                received: format!("'{}'", other),
            }),
        }
    }
}

/// `new Blob(parts, options)` options
#[derive(Debug, Clone, Default)]
pub struct BlobOptions {
    /// MIME type
    pub content_type: String,
    /// `"transparent"` (default) or `"native"`
    pub endings: Option<String>,
}

// ============================================================================
// Blob
// ============================================================================

/// Immutable, sliceable bytes with a MIME type.
#[derive(Debug, Clone)]
pub struct Blob {
    data: Arc<[u8]>,
    start: usize,
    end: usize,
    content_type: String,
}

impl Blob {
    /// Concatenate `parts` into a new blob.
    pub fn new<I>(parts: I, options: BlobOptions) -> NodeResult<Self>
    where
        I: IntoIterator<Item = BlobPart>,
    {
        let endings = match options.endings.as_deref() {
            Some(value) => LineEndings::parse(value)?,
            None => LineEndings::Transparent,
        };

        let mut data = Vec::new();
        for part in parts {
            match part {
                BlobPart::Text(text) => match endings {
                    LineEndings::Transparent => data.extend_from_slice(text.as_bytes()),
                    LineEndings::Native => data.extend_from_slice(convert_line_endings(&text).as_bytes()),
                },
                BlobPart::Bytes(bytes) => data.extend_from_slice(&bytes),
                BlobPart::Blob(blob) => data.extend_from_slice(blob.as_bytes()),
            }
        }

        let end = data.len();
        Ok(Self {
            data: Arc::from(data),
            start: 0,
            end,
            content_type: normalize_type(&options.content_type),
        })
    }

    /// An empty blob
    pub fn empty() -> Self {
        Self {
            data: Arc::from(Vec::new()),
            start: 0,
            end: 0,
            content_type: String::new(),
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Normalized MIME type, `""` if unknown
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// A view of `[start, end)`. Negative offsets count from the end;
    /// everything is clamped to the blob.
    pub fn slice(&self, start: Option<i64>, end: Option<i64>, content_type: Option<&str>) -> Blob {
        let size = self.size();
        let from = relative_index(start.unwrap_or(0), size);
        let to = relative_index(end.unwrap_or(size as i64), size);
        let span = to.saturating_sub(from);
        Blob {
            data: self.data.clone(),
            start: self.start + from,
            end: self.start + from + span,
            content_type: content_type.map(normalize_type).unwrap_or_default(),
        }
    }

    /// Content decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// Copy of the content
    pub fn bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Borrow the content
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }
}

impl Default for Blob {
    fn default() -> Self {
        Self::empty()
    }
}

fn relative_index(index: i64, size: usize) -> usize {
    if index < 0 {
        size.saturating_sub(index.unsigned_abs() as usize)
    } else {
        (index as usize).min(size)
    }
}

/// Lower-case printable ASCII types; anything else is dropped
fn normalize_type(content_type: &str) -> String {
    if content_type.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        content_type.to_ascii_lowercase()
    } else {
        String::new()
    }
}

fn convert_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str(NATIVE_EOL);
            }
            '\n' => out.push_str(NATIVE_EOL),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// File
// ============================================================================

/// `new File(parts, name, options)` options
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// MIME type
    pub content_type: String,
    /// `"transparent"` (default) or `"native"`
    pub endings: Option<String>,
    /// Milliseconds since the epoch; defaults to now
    pub last_modified: Option<i64>,
}

/// A named blob with a modification time.
#[derive(Debug, Clone)]
pub struct File {
    blob: Blob,
    name: String,
    last_modified: i64,
}

impl File {
    /// Build a file from `parts`.
    pub fn new<I>(parts: I, name: impl Into<String>, options: FileOptions) -> NodeResult<Self>
    where
        I: IntoIterator<Item = BlobPart>,
    {
        let blob = Blob::new(
            parts,
            BlobOptions {
                content_type: options.content_type,
                endings: options.endings,
            },
        )?;
        Ok(Self {
            blob,
            name: name.into(),
            last_modified: options.last_modified.unwrap_or_else(now_millis),
        })
    }

    /// File name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modification time in milliseconds since the epoch
    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    /// The file's content as a plain blob
    pub fn as_blob(&self) -> &Blob {
        &self.blob
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.blob.size()
    }

    /// Normalized MIME type
    pub fn content_type(&self) -> &str {
        self.blob.content_type()
    }

    /// See [`Blob::slice`]; the result is a plain blob
    pub fn slice(&self, start: Option<i64>, end: Option<i64>, content_type: Option<&str>) -> Blob {
        self.blob.slice(start, end, content_type)
    }

    /// Content decoded as UTF-8
    pub fn text(&self) -> String {
        self.blob.text()
    }

    /// Copy of the content
    pub fn bytes(&self) -> Vec<u8> {
        self.blob.bytes()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
