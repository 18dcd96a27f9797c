//! Parsing of the `Authorization` request header.
//!
//! Everything here treats its input as hostile: lengths are bounded, every
//! index is checked, and malformed input becomes a [`HeaderError`].

use std::fmt;

use base64::{engine::general_purpose, Engine as _};

/// Longest `Authorization` value we are willing to look at.
pub const MAX_HEADER_LEN: usize = 4096;

/// Upper bound on auth-params in one header.
const MAX_PARAMS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("authorization header exceeds {MAX_HEADER_LEN} bytes")]
    TooLong,
    #[error("authorization header is empty")]
    Empty,
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("invalid base64 payload")]
    InvalidBase64,
    #[error("basic credentials have no ':' separator")]
    MissingSeparator,
    #[error("authorization header is not valid UTF-8")]
    NotUtf8,
    #[error("unexpected character at byte {0}")]
    Syntax(usize),
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    #[error("too many parameters")]
    TooManyParams,
    #[error("duplicate parameter '{0}'")]
    DuplicateParam(String),
    #[error("missing required parameter '{0}'")]
    MissingParam(&'static str),
    #[error("invalid nonce-count")]
    InvalidNonceCount,
    #[error("invalid userhash flag")]
    InvalidUserhash,
}

/// A parsed `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationHeader {
    Basic(BasicCredentials),
    Digest(DigestResponse),
}

impl AuthorizationHeader {
    /// Parse a raw header value. Scheme names match case-insensitively.
    pub fn parse(raw: &[u8]) -> Result<Self, HeaderError> {
        if raw.len() > MAX_HEADER_LEN {
            return Err(HeaderError::TooLong);
        }

        let raw = trim_ows(raw);
        if raw.is_empty() {
            return Err(HeaderError::Empty);
        }

        let split = raw.iter().position(|b| is_ows(*b)).unwrap_or(raw.len());
        let (scheme, rest) = raw.split_at(split);
        let rest = trim_ows(rest);

        if scheme.eq_ignore_ascii_case(b"Basic") {
            BasicCredentials::decode(rest).map(Self::Basic)
        } else if scheme.eq_ignore_ascii_case(b"Digest") {
            let rest = std::str::from_utf8(rest).map_err(|_| HeaderError::NotUtf8)?;
            DigestResponse::parse(rest).map(Self::Digest)
        } else {
            Err(HeaderError::UnsupportedScheme)
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic(_) => "Basic",
            Self::Digest(_) => "Digest",
        }
    }
}

/// Decoded Basic credentials, kept as raw bytes so the comparison is
/// byte-for-byte and independent of any text encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: Vec<u8>,
    pub password: Vec<u8>,
}

impl BasicCredentials {
    /// Decode a token68 payload into `username:password`, splitting on the
    /// first `:`.
    pub fn decode(payload: &[u8]) -> Result<Self, HeaderError> {
        if payload.is_empty() {
            return Err(HeaderError::Empty);
        }

        let mut decoded = general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| HeaderError::InvalidBase64)?;

        let colon = decoded
            .iter()
            .position(|b| *b == b':')
            .ok_or(HeaderError::MissingSeparator)?;

        let password = decoded.split_off(colon + 1);
        decoded.truncate(colon);

        Ok(Self {
            username: decoded,
            password,
        })
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username_len", &self.username.len())
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The fields of a Digest `Authorization` header (RFC 7616 section 3.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestResponse {
    pub username: String,
    pub realm: String,
    pub nonce: String,
    pub uri: String,
    pub response: String,
    pub qop: String,
    /// Nonce-count exactly as sent; it takes part in the hash verbatim.
    pub nc: String,
    pub cnonce: String,
    pub algorithm: Option<String>,
    pub opaque: Option<String>,
    pub userhash: bool,
}

impl DigestResponse {
    pub fn parse(params: &str) -> Result<Self, HeaderError> {
        let mut params = parse_auth_params(params)?;

        let mut take = |name: &'static str| {
            params
                .iter()
                .position(|(n, _)| n == name)
                .map(|i| params.swap_remove(i).1)
        };

        let username = take("username").ok_or(HeaderError::MissingParam("username"))?;
        let realm = take("realm").ok_or(HeaderError::MissingParam("realm"))?;
        let nonce = take("nonce").ok_or(HeaderError::MissingParam("nonce"))?;
        let uri = take("uri").ok_or(HeaderError::MissingParam("uri"))?;
        let response = take("response").ok_or(HeaderError::MissingParam("response"))?;
        let qop = take("qop").ok_or(HeaderError::MissingParam("qop"))?;
        let nc = take("nc").ok_or(HeaderError::MissingParam("nc"))?;
        let cnonce = take("cnonce").ok_or(HeaderError::MissingParam("cnonce"))?;
        let algorithm = take("algorithm");
        let opaque = take("opaque");
        let userhash = match take("userhash") {
            None => false,
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            Some(_) => return Err(HeaderError::InvalidUserhash),
        };

        if nc.len() != 8 || !nc.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HeaderError::InvalidNonceCount);
        }

        Ok(Self {
            username,
            realm,
            nonce,
            uri,
            response,
            qop,
            nc,
            cnonce,
            algorithm,
            opaque,
            userhash,
        })
    }

    /// Numeric value of `nc`. Validated as eight hex digits during parsing.
    pub fn nonce_count(&self) -> u32 {
        u32::from_str_radix(&self.nc, 16).unwrap_or(0)
    }
}

/// Parse a comma separated `name=value` list as used by the Digest scheme.
///
/// Names are lower-cased. Values are either tokens or quoted strings with
/// backslash escapes. Empty list elements are skipped, duplicates rejected.
pub fn parse_auth_params(input: &str) -> Result<Vec<(String, String)>, HeaderError> {
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut params: Vec<(String, String)> = Vec::new();

    loop {
        while pos < bytes.len() && (is_ows(bytes[pos]) || bytes[pos] == b',') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let start = pos;
        while pos < bytes.len() && is_tchar(bytes[pos]) {
            pos += 1;
        }
        if pos == start {
            return Err(HeaderError::Syntax(pos));
        }
        let name = input[start..pos].to_ascii_lowercase();

        pos = skip_ows(bytes, pos);
        if bytes.get(pos) != Some(&b'=') {
            return Err(HeaderError::Syntax(pos));
        }
        pos = skip_ows(bytes, pos + 1);

        let value = if bytes.get(pos) == Some(&b'"') {
            let (value, next) = parse_quoted(bytes, pos + 1)?;
            pos = next;
            value
        } else {
            let start = pos;
            while pos < bytes.len() && is_tchar(bytes[pos]) {
                pos += 1;
            }
            if pos == start {
                return Err(HeaderError::Syntax(pos));
            }
            input[start..pos].to_string()
        };

        if params.iter().any(|(n, _)| *n == name) {
            return Err(HeaderError::DuplicateParam(name));
        }
        if params.len() == MAX_PARAMS {
            return Err(HeaderError::TooManyParams);
        }
        params.push((name, value));

        pos = skip_ows(bytes, pos);
        match bytes.get(pos) {
            None => break,
            Some(b',') => pos += 1,
            Some(_) => return Err(HeaderError::Syntax(pos)),
        }
    }

    Ok(params)
}

/// Render `value` as a quoted-string.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// `pos` points just past the opening quote. Returns the unescaped value and
/// the index after the closing quote.
fn parse_quoted(bytes: &[u8], mut pos: usize) -> Result<(String, usize), HeaderError> {
    let mut buf = Vec::new();
    loop {
        match bytes.get(pos) {
            None => return Err(HeaderError::UnterminatedQuote),
            Some(b'"') => {
                let value = String::from_utf8(buf).map_err(|_| HeaderError::NotUtf8)?;
                return Ok((value, pos + 1));
            }
            Some(b'\\') => {
                let escaped = bytes.get(pos + 1).ok_or(HeaderError::UnterminatedQuote)?;
                buf.push(*escaped);
                pos += 2;
            }
            Some(b) => {
                buf.push(*b);
                pos += 1;
            }
        }
    }
}

fn skip_ows(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_ows(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn trim_ows(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_ows(*first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !is_ows(*last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

// RFC 9110 tchar
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
