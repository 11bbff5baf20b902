use super::layout::{Field, FieldKind, FieldLayout};
use super::text;
use super::wwn::{Naa, Wwn};
use super::RawRecord;
use serde::Serialize;
use std::ops::RangeInclusive;

const INTEGRITY_SIGNATURE: u8 = 0xa5;
const DEFAULT_SECTOR_SIZE: u32 = 512;

/// State of the optional integrity word (word 255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Integrity {
    /// The signature byte is not 0xA5; the device does not report a checksum.
    NotPresent,
    Valid,
    Invalid,
}

/// Interpretation of the nominal media rotation rate (word 217).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaRotation {
    NotReported,
    /// Solid state or otherwise non-rotating media.
    NonRotating,
    Rpm(u16),
    Reserved(u16),
}

impl From<u16> for MediaRotation {
    fn from(rate: u16) -> Self {
        match rate {
            0x0000 => MediaRotation::NotReported,
            0x0001 => MediaRotation::NonRotating,
            0x0401..=0xfffe => MediaRotation::Rpm(rate),
            n => MediaRotation::Reserved(n),
        }
    }
}

/// Everything decoded from one IDENTIFY DEVICE record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedIdentity {
    pub serial_number: String,
    pub firmware_revision: String,
    pub model_number: String,
    /// Raw nominal media rotation rate, see [`DecodedIdentity::media_rotation`].
    pub rotation_rate: u16,
    /// `None` when the device reports no World Wide Name.
    pub wwn: Option<Wwn>,

    /// Word 0 bit 15 is clear for ATA devices.
    pub is_ata: bool,
    pub ata_major_version: Option<&'static str>,
    pub sata_version: Option<&'static str>,
    /// Fastest signaling speed the device supports.
    pub sata_speed: Option<&'static str>,
    pub smart_supported: bool,
    pub smart_enabled: bool,
    pub lba48_supported: bool,
    pub trim_supported: bool,
    /// Number of user addressable logical sectors.
    pub user_sectors: u64,
    pub logical_sector_size: u32,
    pub physical_sector_size: u32,
    pub integrity: Integrity,
}

impl DecodedIdentity {
    pub fn capacity_bytes(&self) -> u64 {
        self.user_sectors.saturating_mul(u64::from(self.logical_sector_size))
    }

    pub fn media_rotation(&self) -> MediaRotation {
        MediaRotation::from(self.rotation_rate)
    }
}

/// Decodes records against a [`FieldLayout`].
///
/// A decoder keeps no state between calls. Fields missing from the layout
/// decode to their empty or zero value.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    layout: FieldLayout<'a>,
}

impl Decoder<'static> {
    pub const fn standard() -> Self {
        Self::new(FieldLayout::STANDARD)
    }
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> Decoder<'a> {
    pub const fn new(layout: FieldLayout<'a>) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FieldLayout<'a> {
        &self.layout
    }

    /// Decodes one record. Never fails: garbage in a field yields a garbage or
    /// empty value for that field only.
    pub fn decode(&self, record: &RawRecord) -> DecodedIdentity {
        log::trace!("decoding {:?} with {} layout fields", record, self.layout.entries().len());

        let general_config = self.word(record, Field::GeneralConfig);

        let command_sets_valid = validity_marker(self.word(record, Field::CommandSetSupported2));
        let supported = self.word(record, Field::CommandSetSupported);
        let supported2 = self.word(record, Field::CommandSetSupported2);
        let smart_supported = command_sets_valid && is_set(supported, 0);
        let lba48_supported = command_sets_valid && is_set(supported2, 10);

        let enabled_valid = validity_marker(self.word(record, Field::CommandSetDefault));
        let smart_enabled = enabled_valid && is_set(self.word(record, Field::CommandSetEnabled), 0);

        let lba48 = self.uint(record, Field::UserSectors48);
        let user_sectors = if lba48_supported && lba48 != 0 {
            lba48
        } else {
            self.uint(record, Field::UserSectors28)
        };

        let (logical_sector_size, physical_sector_size) = self.sector_sizes(record);

        DecodedIdentity {
            serial_number: self.text(record, Field::SerialNumber),
            firmware_revision: self.text(record, Field::FirmwareRevision),
            model_number: self.text(record, Field::ModelNumber),
            rotation_rate: self.word(record, Field::RotationRate),
            wwn: self.wwn(record),
            is_ata: !is_set(general_config, 15),
            ata_major_version: ata_major_version(self.word(record, Field::MajorVersion)),
            sata_version: sata_version(self.word(record, Field::TransportMajor)),
            sata_speed: sata_speed(self.word(record, Field::SataCapabilities)),
            smart_supported,
            smart_enabled,
            lba48_supported,
            trim_supported: is_set(self.word(record, Field::DataSetManagement), 0),
            user_sectors,
            logical_sector_size,
            physical_sector_size,
            integrity: self.integrity(record),
        }
    }

    /// A string field in reading order with its padding left in place.
    pub fn raw_text(&self, record: &RawRecord, field: Field) -> Option<String> {
        let entry = self.layout.get(field)?;
        if entry.kind != FieldKind::Text {
            return None;
        }
        let bytes = self.bytes(record, field)?;
        Some(text::swap_pairs(bytes).into_iter().map(char::from).collect())
    }

    fn bytes<'r>(&self, record: &'r RawRecord, field: Field) -> Option<&'r [u8]> {
        self.layout
            .get(field)
            .map(|entry| &record.as_bytes()[entry.offset..entry.offset + entry.width])
    }

    fn text(&self, record: &RawRecord, field: Field) -> String {
        self.bytes(record, field).map(text::normalize).unwrap_or_default()
    }

    /// Little-endian numeric read; multi-word values store the low word first.
    fn uint(&self, record: &RawRecord, field: Field) -> u64 {
        self.bytes(record, field)
            .map(|bytes| bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
            .unwrap_or(0)
    }

    fn word(&self, record: &RawRecord, field: Field) -> u16 {
        debug_assert!(matches!(field.kind(), FieldKind::Uint16 | FieldKind::Bitfield));
        self.uint(record, field) as u16
    }

    fn wwn(&self, record: &RawRecord) -> Option<Wwn> {
        let bytes = self.bytes(record, Field::Wwn)?;
        let mut words = [0u16; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_le_bytes([chunk[0], chunk[1]]);
        }

        let wwn = Wwn::from_words(words)?;
        if let Naa::Other(code) = wwn.naa() {
            log::debug!(
                "WWN {:#018x} uses NAA {:x}h, passing it through undecoded",
                wwn.value(),
                code
            );
        }
        Some(wwn)
    }

    fn sector_sizes(&self, record: &RawRecord) -> (u32, u32) {
        let word = self.word(record, Field::SectorSize);
        if !validity_marker(word) {
            return (DEFAULT_SECTOR_SIZE, DEFAULT_SECTOR_SIZE);
        }

        let mut logical = DEFAULT_SECTOR_SIZE;
        if is_set(word, 12) {
            // Words 117-118 count 16-bit words, not bytes.
            let words = self.uint(record, Field::LogicalSectorSize);
            match u32::try_from(words * 2) {
                Ok(size) if size >= DEFAULT_SECTOR_SIZE => logical = size,
                _ => log::debug!("ignoring logical sector size of {} words", words),
            }
        }

        let physical = if is_set(word, 13) {
            logical.checked_mul(1 << (word & 0xf)).unwrap_or(logical)
        } else {
            logical
        };
        (logical, physical)
    }

    fn integrity(&self, record: &RawRecord) -> Integrity {
        if self.layout.get(Field::Integrity).is_none() {
            return Integrity::NotPresent;
        }
        let word = self.word(record, Field::Integrity);
        if (word & 0xff) as u8 != INTEGRITY_SIGNATURE {
            return Integrity::NotPresent;
        }
        match record.checksum() {
            0 => Integrity::Valid,
            sum => {
                log::debug!(
                    "identify checksum mismatch: byte sum is {:#04x}, stored {:#04x}",
                    sum,
                    word >> 8
                );
                Integrity::Invalid
            }
        }
    }
}

fn is_set(word: u16, bit: u32) -> bool {
    word & (1 << bit) != 0
}

/// Bits 15:14 of a validity word must read 01.
fn validity_marker(word: u16) -> bool {
    word & 0xc000 == 0x4000
}

fn reported(word: u16) -> bool {
    word != 0x0000 && word != 0xffff
}

fn highest_bit(word: u16, bits: RangeInclusive<u32>) -> Option<u32> {
    bits.rev().find(|&bit| is_set(word, bit))
}

fn ata_major_version(word: u16) -> Option<&'static str> {
    if !reported(word) {
        return None;
    }
    // Bits 13 and 14 are reserved.
    match highest_bit(word, 4..=12)? {
        4 => Some("ATA/ATAPI-4"),
        5 => Some("ATA/ATAPI-5"),
        6 => Some("ATA/ATAPI-6"),
        7 => Some("ATA/ATAPI-7"),
        8 => Some("ATA8-ACS"),
        9 => Some("ACS-2"),
        10 => Some("ACS-3"),
        11 => Some("ACS-4"),
        _ => Some("ACS-5"),
    }
}

fn sata_version(word: u16) -> Option<&'static str> {
    // Bits 15:12 give the transport type, 1h is Serial.
    if !reported(word) || word >> 12 != 0x1 {
        return None;
    }
    match highest_bit(word, 0..=10)? {
        0 => Some("ATA8-AST"),
        1 => Some("SATA 1.0a"),
        2 => Some("SATA II Ext"),
        3 => Some("SATA 2.5"),
        4 => Some("SATA 2.6"),
        5 => Some("SATA 3.0"),
        6 => Some("SATA 3.1"),
        7 => Some("SATA 3.2"),
        8 => Some("SATA 3.3"),
        9 => Some("SATA 3.4"),
        _ => Some("SATA 3.5"),
    }
}

fn sata_speed(word: u16) -> Option<&'static str> {
    if !reported(word) {
        return None;
    }
    match highest_bit(word, 1..=3)? {
        1 => Some("1.5 Gb/s"),
        2 => Some("3.0 Gb/s"),
        _ => Some("6.0 Gb/s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ata::layout::FieldEntry;
    use crate::ata::IDENTIFY_SIZE;

    fn set_word(bytes: &mut [u8; IDENTIFY_SIZE], index: usize, value: u16) {
        bytes[2 * index..2 * index + 2].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn zeroed_record_decodes_to_empty_values() {
        let identity = Decoder::standard().decode(&RawRecord::default());
        assert_eq!(identity.serial_number, "");
        assert_eq!(identity.model_number, "");
        assert_eq!(identity.rotation_rate, 0);
        assert_eq!(identity.wwn, None);
        assert!(identity.is_ata);
        assert_eq!(identity.ata_major_version, None);
        assert_eq!(identity.sata_version, None);
        assert_eq!(identity.sata_speed, None);
        assert!(!identity.smart_supported);
        assert_eq!(identity.user_sectors, 0);
        assert_eq!(identity.logical_sector_size, 512);
        assert_eq!(identity.physical_sector_size, 512);
        assert_eq!(identity.integrity, Integrity::NotPresent);
        assert_eq!(identity.media_rotation(), MediaRotation::NotReported);
    }

    #[test]
    fn all_ones_record_is_absorbed() {
        let identity = Decoder::standard().decode(&RawRecord::new([0xff; IDENTIFY_SIZE]));
        assert_eq!(identity.serial_number.chars().count(), 20);
        assert!(!identity.is_ata);
        assert_eq!(identity.ata_major_version, None);
        assert_eq!(identity.rotation_rate, 0xffff);
        assert_eq!(identity.media_rotation(), MediaRotation::Reserved(0xffff));
        assert_eq!(identity.wwn.map(|w| w.value()), Some(u64::MAX));
        assert_eq!(identity.integrity, Integrity::NotPresent);
    }

    #[test]
    fn rotation_rate_is_not_byte_swapped() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        set_word(&mut bytes, 217, 7200);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert_eq!(identity.rotation_rate, 7200);
        assert_eq!(identity.media_rotation(), MediaRotation::Rpm(7200));
    }

    #[test]
    fn advanced_format_sector_sizes() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        // 512e: logical 512, 8 logical sectors per physical sector.
        set_word(&mut bytes, 106, 0x6003);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert_eq!((identity.logical_sector_size, identity.physical_sector_size), (512, 4096));

        // 4Kn: logical size given in words 117-118.
        set_word(&mut bytes, 106, 0x5000);
        set_word(&mut bytes, 117, 2048);
        set_word(&mut bytes, 118, 0);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert_eq!((identity.logical_sector_size, identity.physical_sector_size), (4096, 4096));
    }

    #[test]
    fn sector_size_word_without_marker_is_ignored() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        set_word(&mut bytes, 106, 0x2003);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert_eq!(identity.physical_sector_size, 512);
    }

    #[test]
    fn capacity_prefers_lba48_when_supported() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        set_word(&mut bytes, 60, 0xffff);
        set_word(&mut bytes, 61, 0x0fff);
        set_word(&mut bytes, 100, 0x66f0);
        set_word(&mut bytes, 101, 0x5754);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert!(!identity.lba48_supported);
        assert_eq!(identity.user_sectors, 0x0fff_ffff);

        set_word(&mut bytes, 83, 0x4400);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert!(identity.lba48_supported);
        assert_eq!(identity.user_sectors, 1_465_149_168);
        assert_eq!(identity.capacity_bytes(), 750_156_374_016);
    }

    #[test]
    fn smart_bits_need_validity_markers() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        set_word(&mut bytes, 82, 0x0001);
        set_word(&mut bytes, 85, 0x0001);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert!(!identity.smart_supported);
        assert!(!identity.smart_enabled);

        set_word(&mut bytes, 83, 0x4000);
        set_word(&mut bytes, 87, 0x4000);
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert!(identity.smart_supported);
        assert!(identity.smart_enabled);
    }

    #[test]
    fn version_strings() {
        assert_eq!(ata_major_version(0x01f0), Some("ATA8-ACS"));
        assert_eq!(ata_major_version(0x0ff0), Some("ACS-4"));
        assert_eq!(ata_major_version(0x1ff0), Some("ACS-5"));
        assert_eq!(ata_major_version(0x1000), Some("ACS-5"));
        assert_eq!(ata_major_version(0x6000), None);
        assert_eq!(ata_major_version(0x000e), None);
        assert_eq!(sata_version(0x10ff), Some("SATA 3.2"));
        assert_eq!(sata_version(0x007f), None);
        assert_eq!(sata_speed(0x0006), Some("3.0 Gb/s"));
        assert_eq!(sata_speed(0xffff), None);
    }

    #[test]
    fn valid_integrity_word() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        set_word(&mut bytes, 0, 0x0040);
        let sum = bytes.iter().fold(INTEGRITY_SIGNATURE, |acc, &b| acc.wrapping_add(b));
        bytes[510] = INTEGRITY_SIGNATURE;
        bytes[511] = sum.wrapping_neg();
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert_eq!(identity.integrity, Integrity::Valid);

        bytes[20] = b'X';
        let identity = Decoder::standard().decode(&RawRecord::new(bytes));
        assert_eq!(identity.integrity, Integrity::Invalid);
    }

    #[test]
    fn raw_text_keeps_padding() {
        let mut bytes = [0u8; IDENTIFY_SIZE];
        bytes[46..54].copy_from_slice(&text::encode("1.0", 8));
        let decoder = Decoder::standard();
        let record = RawRecord::new(bytes);
        assert_eq!(decoder.raw_text(&record, Field::FirmwareRevision).as_deref(), Some("1.0     "));
        assert_eq!(decoder.raw_text(&record, Field::RotationRate), None);
    }

    #[test]
    fn custom_layout_only_decodes_listed_fields() {
        let entries = [FieldEntry::words(Field::ModelNumber, 27, 20, FieldKind::Text)];
        let layout = FieldLayout::new(&entries).unwrap();
        let mut bytes = [0u8; IDENTIFY_SIZE];
        bytes[54..94].copy_from_slice(&text::encode("Some Model", 40));
        set_word(&mut bytes, 217, 1);
        let identity = Decoder::new(layout).decode(&RawRecord::new(bytes));
        assert_eq!(identity.model_number, "Some Model");
        assert_eq!(identity.rotation_rate, 0);
    }
}
