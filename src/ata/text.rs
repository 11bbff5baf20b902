//! ATA string fields.
//!
//! Each 16-bit word holds two characters with the first character in the
//! high byte, so in the little-endian record the bytes of every pair appear
//! reversed. This is unrelated to how numeric words are read.

/// Swaps every adjacent byte pair, yielding the characters in reading order.
///
/// A trailing unpaired byte is dropped; layouts never produce one.
pub fn swap_pairs(bytes: &[u8]) -> Vec<u8> {
    bytes
        .chunks_exact(2)
        .flat_map(|chunk| [chunk[1], chunk[0]])
        .collect()
}

/// Converts a raw string field into text with trailing padding removed.
///
/// Bytes outside printable ASCII are carried through as the matching Latin-1
/// character rather than rejected.
pub fn normalize(bytes: &[u8]) -> String {
    let text = swap_pairs(bytes)
        .into_iter()
        .map(|b| b as char)
        .collect::<String>();

    if text.chars().any(|c| !is_printable(c) && c != '\0') {
        log::debug!("identify string {:?} contains non-printable bytes", text);
    }

    text.trim_end_matches(|c: char| c == ' ' || c == '\0').to_string()
}

fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Encodes `text` into a `width`-byte string field, space padded. Used to
/// build records for tests and tooling.
pub fn encode(text: &str, width: usize) -> Vec<u8> {
    let mut padded: Vec<u8> = text.bytes().take(width).collect();
    padded.resize(width, b' ');
    swap_pairs(&padded)
}
