//! `application/x-www-form-urlencoded` decoding.
//!
//! Decoding is byte-oriented: `+` becomes a space and `%XX` becomes the
//! byte `0xXX`. The result is never validated as UTF-8, so keys and values
//! are kept as raw bytes and only viewed as text on demand.

use std::borrow::Cow;

/// Decoded form fields in body order. A repeated key keeps its first
/// position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl FormData {
    /// Decode a urlencoded body. Pairs are separated by `&` or `;`; empty
    /// segments are skipped.
    pub fn parse(body: &[u8]) -> Self {
        let mut form = FormData::default();
        for segment in body.split(|b| *b == b'&' || *b == b';') {
            if segment.is_empty() {
                continue;
            }
            let (key, value) = match segment.iter().position(|b| *b == b'=') {
                Some(eq) => (&segment[..eq], &segment[eq + 1..]),
                None => (segment, &[][..]),
            };
            form.insert(unescape(key), unescape(value));
        }
        form
    }

    fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Text view of a value. Invalid UTF-8 is replaced, not rejected.
    pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get_bytes(key.as_bytes()).map(String::from_utf8_lossy)
    }

    /// Raw decoded bytes of a value.
    pub fn get_bytes(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for FormData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{:?} => {:?}",
                String::from_utf8_lossy(k),
                String::from_utf8_lossy(v)
            )?;
        }
        write!(f, "}}")
    }
}

/// `+` → space, then `%XX` → byte. Malformed escapes are kept literally.
fn unescape(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match input.get(i + 1..i + 3).and_then(|pair| hex_pair(pair[0], pair[1])) {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}
