//! Text armor for DER objects.
//!
//! ```text
//! -----BEGIN <LABEL>-----
//! <base64, 64 characters per line>
//! -----END <LABEL>-----
//! ```

use crate::types::*;

const LINE_LENGTH: usize = 64;

/// Armor `der` under `label`.
pub fn to_envelope(label: &str, der: &[u8]) -> String {
    let encoded = base64::encode(der);
    let mut text = format!("-----BEGIN {}-----\n", label);
    let mut start = 0;
    while start < encoded.len() {
        let stop = usize::min(start + LINE_LENGTH, encoded.len());
        text.push_str(&encoded[start..stop]);
        text.push('\n');
        start = stop;
    }
    text.push_str(&format!("-----END {}-----\n", label));
    text
}

/// Remove the armor from `text`, which must carry exactly `label`.
///
/// Surrounding whitespace and line endings are ignored.
pub fn from_envelope(label: &str, text: &str) -> Result<Vec<u8>, Error> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);
    let mut lines = text.trim().lines().map(str::trim);
    if lines.next() != Some(begin.as_str()) {
        return Err(Error::MalformedEncoding);
    }
    let mut body = String::new();
    while let Some(line) = lines.next() {
        if line == end {
            return if lines.all(str::is_empty) {
                base64::decode(&body).map_err(|_| Error::MalformedEncoding)
            } else {
                Err(Error::MalformedEncoding)
            };
        }
        body.push_str(line);
    }
    Err(Error::MalformedEncoding)
}
