/*!
 * Property value encoding for the model format
 *
 * Every `PropertyValue` maps to the already-escaped text that goes between
 * its property tags. Composite kinds (vectors, frames, asset references)
 * produce nested elements.
 */

use std::borrow::Cow;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use quick_xml::escape::{escape, unescape};
use regex::Regex;
use tracing::warn;

use crate::error::Result;
use crate::types::{CFrame, PropertyValue, Vector2, Vector3};

/// Prefix the host recognises for numeric asset ids
pub const ASSET_URL_PREFIX: &str = "rbxassetid://";

// quick-xml refuses to resolve a reference to NUL, which `encode_text`
// produces for NUL characters.
static NUL_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:0+|[xX]0+);").expect("NUL reference pattern is valid"));

static ASSET_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:rbxassetid://)?(\d+)$").expect("asset id pattern is valid")
});

/// Encode a property value for the model document
pub fn encode(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Bool(b) => encode_bool(*b).to_string(),
        PropertyValue::Int(i) => i.to_string(),
        PropertyValue::Double(d) => encode_double(*d),
        PropertyValue::String(s) | PropertyValue::ProtectedString(s) => encode_text(s),
        PropertyValue::Content(raw) => encode_content(raw),
        PropertyValue::Vector2(v) => encode_vector2(v),
        PropertyValue::Vector3(v) => encode_vector3(v),
        PropertyValue::CFrame(cf) => encode_cframe(cf),
    }
}

/// Lowercase boolean literal
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Locale independent double formatting
pub fn encode_double(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_string()
    } else if value.is_infinite() {
        let inf = if value > 0.0 { "INF" } else { "-INF" };
        inf.to_string()
    } else {
        // Display never switches to exponent notation for f64.
        format!("{}", value)
    }
}

/// Escape text for the document.
///
/// Markup characters become named entities and anything outside printable
/// ASCII (newline and carriage return excepted) becomes a numeric character
/// reference. The host trims leading whitespace on import, so a value that
/// starts with whitespace or a backslash gets a backslash prepended, which
/// readers strip again.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);

    if text
        .chars()
        .next()
        .map_or(false, |c| c.is_whitespace() || c == '\\')
    {
        out.push('\\');
    }

    let markup_escaped: Cow<'_, str> = escape(text);
    for c in markup_escaped.chars() {
        match c {
            '\n' | '\r' | ' '..='~' => out.push(c),
            other => {
                let _ = write!(out, "&#{};", other as u32);
            }
        }
    }

    out
}

/// Reverse of [`encode_text`]
pub fn decode_text(encoded: &str) -> Result<String> {
    let body = encoded.strip_prefix('\\').unwrap_or(encoded);
    let body = NUL_REFERENCE.replace_all(body, "\u{0}");
    Ok(unescape(&body)?.into_owned())
}

/// Numeric asset id extracted from a raw reference
pub fn asset_id(raw: &str) -> Option<u64> {
    ASSET_ID
        .captures(raw.trim())
        .and_then(|caps| caps[1].parse().ok())
}

fn encode_content(raw: &str) -> String {
    match asset_id(raw) {
        Some(id) => format!("<url>{}{}</url>", ASSET_URL_PREFIX, id),
        None => {
            warn!("asset reference {:?} is not numeric, writing null", raw);
            "<null></null>".to_string()
        }
    }
}

fn encode_vector2(v: &Vector2) -> String {
    format!(
        "<X>{}</X><Y>{}</Y>",
        encode_double(v.x),
        encode_double(v.y)
    )
}

fn encode_vector3(v: &Vector3) -> String {
    format!(
        "<X>{}</X><Y>{}</Y><Z>{}</Z>",
        encode_double(v.x),
        encode_double(v.y),
        encode_double(v.z)
    )
}

fn encode_cframe(cf: &CFrame) -> String {
    let mut out = encode_vector3(&cf.position);
    for (row, values) in cf.rotation.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let _ = write!(out, "<R{row}{col}>{}</R{row}{col}>", encode_double(*value));
        }
    }
    out
}
