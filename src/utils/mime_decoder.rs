// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =?charset?encoding?encoded-text?=
    static ref ENCODED_WORD_RE: Regex =
        Regex::new(r"=\?([^?\s]+)\?([BbQq])\?([^?\s]*)\?=").expect("encoded-word pattern is valid");
}

/// Decodes RFC 2047 encoded-words in a header value.
///
/// Text outside encoded-words is kept as-is. Whitespace separating two
/// adjacent encoded-words is dropped. A word that fails to decode is left
/// in its encoded form.
pub fn decode_mime_header(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut previous_was_word = false;

    for caps in ENCODED_WORD_RE.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        let gap = &input[cursor..whole.start()];
        if !(previous_was_word && gap.trim().is_empty()) {
            out.push_str(gap);
        }

        let charset = &caps[1];
        let payload = &caps[3];
        let bytes = match &caps[2] {
            "B" | "b" => BASE64.decode(payload).ok(),
            _ => Some(q_decode(payload)),
        };
        match bytes.and_then(|b| to_text(charset, b)) {
            Some(text) => out.push_str(&text),
            None => out.push_str(whole.as_str()),
        }

        cursor = whole.end();
        previous_was_word = true;
    }

    out.push_str(&input[cursor..]);
    out
}

/// Q encoding: `_` is a space, `=XX` is a hex octet, anything else is literal.
fn q_decode(payload: &str) -> Vec<u8> {
    let raw = payload.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'_' => out.push(b' '),
            b'=' => match payload
                .get(i + 1..i + 3)
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                Some(octet) => {
                    out.push(octet);
                    i += 3;
                    continue;
                }
                None => out.push(b'='),
            },
            other => out.push(other),
        }
        i += 1;
    }
    out
}

fn to_text(charset: &str, bytes: Vec<u8>) -> Option<String> {
    // RFC 2231 language suffix: charset*lang
    let charset = charset.split('*').next().unwrap_or(charset);
    if charset.eq_ignore_ascii_case("iso-8859-1") || charset.eq_ignore_ascii_case("latin1") {
        return Some(bytes.into_iter().map(char::from).collect());
    }
    String::from_utf8(bytes).ok()
}
