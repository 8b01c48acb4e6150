//! Textual preference-specification documents.
//!
//! ```text
//! <PREFERENCE-SPECIFICATION>
//!   <PREFERENCE-VARIABLE>
//!     <VARIABLE-NAME>Weather</VARIABLE-NAME>
//!     <DOMAIN-VALUE>Fair</DOMAIN-VALUE>
//!     <DOMAIN-VALUE>Rain</DOMAIN-VALUE>
//!   </PREFERENCE-VARIABLE>
//!   <PREFERENCE-STATEMENT>
//!     <STATEMENT-ID>v0_p0</STATEMENT-ID>
//!     <PREFERENCE-VARIABLE>Weather</PREFERENCE-VARIABLE>
//!     <PREFERENCE>Fair:Rain</PREFERENCE>
//!   </PREFERENCE-STATEMENT>
//! </PREFERENCE-SPECIFICATION>
//! ```
//!
//! Each `PREFERENCE` segment `a:b` states that `a` strictly precedes `b`;
//! segments chain at shared endpoints into one total order. `CONDITION`
//! elements (`Parent=value`) address the CPT leaf and imply a parent link.
//!
//! The format has no notation for weak relations or excluded values, so
//! [`encode`] writes every relation as strict.

mod decode;
mod encode;

pub use decode::{decode, Decoded};
pub use encode::{encode, Document};

use std::fmt;

/// Display adapter escaping XML markup characters.
pub(crate) struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(at) = rest.find(|c: char| matches!(c, '&' | '<' | '>')) {
            f.write_str(&rest[..at])?;
            f.write_str(match rest.as_bytes()[at] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                _ => "&gt;",
            })?;
            rest = &rest[at + 1..];
        }
        f.write_str(rest)
    }
}

/// Resolves the predefined and numeric character references of `text`.
/// Unknown references are kept verbatim.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let resolved = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, end))
        });
        match resolved {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Character data of an element: references resolved, CDATA sections kept
/// verbatim, surrounding whitespace trimmed.
pub(crate) fn element_text(raw: &str) -> String {
    const OPEN: &str = "<![CDATA[";
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&unescape(&rest[..start]));
        let body = &rest[start + OPEN.len()..];
        let end = body.find("]]>").unwrap_or(body.len());
        out.push_str(&body[..end]);
        rest = body.get(end + 3..).unwrap_or("");
    }
    out.push_str(&unescape(rest));
    out.trim().to_string()
}
