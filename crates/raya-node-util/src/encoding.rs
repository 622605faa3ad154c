//! Buffer encoding names

use std::fmt;

/// Canonical buffer encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// `utf8`
    Utf8,
    /// `utf16le` (also `ucs2`)
    Utf16le,
    /// `latin1` (also `binary`)
    Latin1,
    /// `base64`
    Base64,
    /// `base64url`
    Base64Url,
    /// `hex`
    Hex,
    /// `ascii`
    Ascii,
}

impl Encoding {
    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf16le => "utf16le",
            Encoding::Latin1 => "latin1",
            Encoding::Base64 => "base64",
            Encoding::Base64Url => "base64url",
            Encoding::Hex => "hex",
            Encoding::Ascii => "ascii",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a user-supplied encoding name to its canonical form.
///
/// Matching is case-insensitive. A missing or empty name means UTF-8;
/// unknown names yield `None`.
pub fn normalize_encoding(name: Option<&str>) -> Option<Encoding> {
    let name = match name {
        None | Some("") => return Some(Encoding::Utf8),
        Some(name) => name,
    };
    // Fast path for the spellings almost everyone uses
    match name {
        "utf8" | "utf-8" => return Some(Encoding::Utf8),
        _ => {}
    }
    match name.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => Some(Encoding::Utf8),
        "ucs2" | "ucs-2" | "utf16le" | "utf-16le" => Some(Encoding::Utf16le),
        "latin1" | "binary" => Some(Encoding::Latin1),
        "base64" => Some(Encoding::Base64),
        "base64url" => Some(Encoding::Base64Url),
        "hex" => Some(Encoding::Hex),
        "ascii" => Some(Encoding::Ascii),
        _ => None,
    }
}
