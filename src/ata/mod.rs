//! ATA IDENTIFY DEVICE (command ECh) record handling.
//!
//! The record is 256 little-endian 16-bit words. Numeric fields are read as
//! plain words, text fields additionally have the two bytes of every word
//! swapped. The two conventions are kept in separate modules.

pub mod decode;
pub mod layout;
pub mod text;
pub mod wwn;

use crate::error::IdentifyError;
use std::io::Read;
use std::ops::Range;

/// Size in bytes of an IDENTIFY DEVICE response.
pub const IDENTIFY_SIZE: usize = 512;

/// Number of 16-bit words in an IDENTIFY DEVICE response.
pub const IDENTIFY_WORDS: usize = IDENTIFY_SIZE / 2;

/// One uninterpreted IDENTIFY DEVICE response, exactly as the device returned it.
#[derive(Clone, PartialEq, Eq)]
pub struct RawRecord {
    bytes: [u8; IDENTIFY_SIZE],
}

impl RawRecord {
    pub fn new(bytes: [u8; IDENTIFY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copies a buffer into a record, rejecting anything that is not 512 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifyError> {
        let array =
            <[u8; IDENTIFY_SIZE]>::try_from(bytes).map_err(|_| IdentifyError::InvalidLength {
                expected: IDENTIFY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self::new(array))
    }

    /// Reads a record from a dump. The reader must yield exactly 512 bytes.
    ///
    /// At most 513 bytes are consumed, so an oversized or endless source is
    /// rejected without being drained.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, IdentifyError> {
        let mut buf = Vec::with_capacity(IDENTIFY_SIZE + 1);
        reader.take(IDENTIFY_SIZE as u64 + 1).read_to_end(&mut buf)?;
        Self::from_slice(&buf)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFY_SIZE] {
        &self.bytes
    }

    /// Reads word `index` in device (little-endian) order, independent of the host.
    ///
    /// # Panics
    /// Panics if `index >= 256`.
    pub fn word(&self, index: usize) -> u16 {
        u16::from_le_bytes([self.bytes[2 * index], self.bytes[2 * index + 1]])
    }

    /// Iterates over a run of words, e.g. `words(108..112)` for the WWN.
    pub fn words(&self, range: Range<usize>) -> impl Iterator<Item = u16> + '_ {
        range.map(move |i| self.word(i))
    }

    /// Byte sum of the whole record, modulo 256. A record carrying a valid
    /// integrity word sums to zero.
    pub fn checksum(&self) -> u8 {
        self.bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
    }
}

impl Default for RawRecord {
    fn default() -> Self {
        Self::new([0; IDENTIFY_SIZE])
    }
}

impl From<[u8; IDENTIFY_SIZE]> for RawRecord {
    fn from(bytes: [u8; IDENTIFY_SIZE]) -> Self {
        Self::new(bytes)
    }
}

impl TryFrom<&[u8]> for RawRecord {
    type Error = IdentifyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl std::fmt::Debug for RawRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawRecord")
            .field("general_config", &format_args!("{:#06x}", self.word(0)))
            .field("checksum", &self.checksum())
            .finish()
    }
}
