//! Site metadata resolved from the environment.
//!
//! Each setting reads one variable, percent-decodes it when present and
//! falls back to a fixed literal otherwise. Decoding failures abort the
//! build instead of falling back.

use std::env::{self, VarError};
use std::str::Utf8Error;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} contains a malformed percent escape at byte {offset}: {value:?}")]
    MalformedEscape {
        var: &'static str,
        value: String,
        offset: usize,
    },
    #[error("{var} does not decode to valid UTF-8: {value:?}")]
    InvalidUtf8 {
        var: &'static str,
        value: String,
        #[source]
        source: Utf8Error,
    },
    #[error("{var} is not valid unicode")]
    NotUnicode { var: &'static str },
}

/// One environment-driven setting and its fallback.
#[derive(Debug, Clone, Copy)]
pub struct Setting {
    pub var: &'static str,
    pub default: &'static str,
}

pub const BLOG_NAME: Setting = Setting {
    var: "BLOG_NAME",
    default: "Adeyemi Opeyemi",
};

pub const BLOG_TITLE: Setting = Setting {
    var: "BLOG_TITLE",
    default: "Full stack developer portfolio",
};

pub const BLOG_FOOTER_TEXT: Setting = Setting {
    var: "BLOG_FOOTER_TEXT",
    default: "Thanks for visiting my portfolio! Let's connect.",
};

/// Display strings shared by every page of one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub name: String,
    pub blog_title: String,
    pub footer_text: String,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve_with(|var| env::var(var))
    }

    /// Resolves every setting through `lookup`, which has the shape of
    /// [`std::env::var`].
    pub fn resolve_with<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Result<String, VarError>,
    {
        let mut read = |setting: Setting| -> Result<String, ConfigError> {
            match lookup(setting.var) {
                Ok(value) => resolve(Some(value.as_str()), setting),
                Err(VarError::NotPresent) => resolve(None, setting),
                Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { var: setting.var }),
            }
        };

        Ok(Self {
            name: read(BLOG_NAME)?,
            blog_title: read(BLOG_TITLE)?,
            footer_text: read(BLOG_FOOTER_TEXT)?,
        })
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: BLOG_NAME.default.to_string(),
            blog_title: BLOG_TITLE.default.to_string(),
            footer_text: BLOG_FOOTER_TEXT.default.to_string(),
        }
    }
}

/// Decodes `value`, or returns the setting's default when it is absent or empty.
pub fn resolve(value: Option<&str>, setting: Setting) -> Result<String, ConfigError> {
    match value {
        Some(raw) if !raw.is_empty() => decode(raw, setting.var),
        _ => {
            debug!(var = setting.var, "using default");
            Ok(setting.default.to_string())
        }
    }
}

/// Bytes whose escapes stay encoded, matching JavaScript's `decodeURI`.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";

fn decode(raw: &str, var: &'static str) -> Result<String, ConfigError> {
    // percent_decode_str passes bad escapes through untouched, so reject them first.
    if let Some(offset) = malformed_escape(raw) {
        return Err(ConfigError::MalformedEscape {
            var,
            value: raw.to_string(),
            offset,
        });
    }

    let mut decoded = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = reserved_escape(rest) {
        decoded.extend(percent_decode_str(&rest[..at]));
        decoded.extend_from_slice(rest[at..at + 3].as_bytes());
        rest = &rest[at + 3..];
    }
    decoded.extend(percent_decode_str(rest));

    String::from_utf8(decoded).map_err(|e| ConfigError::InvalidUtf8 {
        var,
        value: raw.to_string(),
        source: e.utf8_error(),
    })
}

/// Offset of the first escape that decodes to a reserved byte. Escapes must
/// already be well formed.
fn reserved_escape(raw: &str) -> Option<usize> {
    raw.match_indices('%').map(|(i, _)| i).find(|&i| {
        raw.get(i + 1..i + 3)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .map_or(false, |byte| URI_RESERVED.contains(&byte))
    })
}

fn malformed_escape(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .map(|(i, _)| i)
        .find(|&i| {
            !matches!(
                bytes.get(i + 1..i + 3),
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
        })
}
