//! Byte offsets of the IDENTIFY DEVICE fields this crate decodes.
//!
//! The layout is a plain table rather than a `#[repr(C, packed)]` overlay, so
//! every offset is visible in one place and no struct padding rules apply.

use super::IDENTIFY_SIZE;
use crate::error::LayoutError;

/// Fields known to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    GeneralConfig,
    SerialNumber,
    FirmwareRevision,
    ModelNumber,
    UserSectors28,
    SataCapabilities,
    MajorVersion,
    CommandSetSupported,
    CommandSetSupported2,
    CommandSetEnabled,
    CommandSetDefault,
    UserSectors48,
    SectorSize,
    Wwn,
    LogicalSectorSize,
    DataSetManagement,
    RotationRate,
    TransportMajor,
    Integrity,
}

impl Field {
    /// The kind a layout entry for this field must declare.
    pub const fn kind(self) -> FieldKind {
        match self {
            Field::SerialNumber | Field::FirmwareRevision | Field::ModelNumber => FieldKind::Text,
            Field::UserSectors28 | Field::LogicalSectorSize => FieldKind::Uint32,
            Field::UserSectors48 => FieldKind::Uint64,
            Field::Wwn => FieldKind::Wwn,
            Field::RotationRate => FieldKind::Uint16,
            _ => FieldKind::Bitfield,
        }
    }
}

/// How the bytes of a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One little-endian word.
    Uint16,
    /// Two words, low word first.
    Uint32,
    /// Four words, low word first.
    Uint64,
    /// One word of flag bits.
    Bitfield,
    /// ASCII with the bytes of each word swapped.
    Text,
    /// Four words, most significant word first.
    Wwn,
}

impl FieldKind {
    /// Required width in bytes, `None` for variable width kinds.
    pub const fn width(self) -> Option<usize> {
        match self {
            FieldKind::Uint16 | FieldKind::Bitfield => Some(2),
            FieldKind::Uint32 => Some(4),
            FieldKind::Uint64 | FieldKind::Wwn => Some(8),
            FieldKind::Text => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    pub field: Field,
    /// Byte offset into the record.
    pub offset: usize,
    /// Width in bytes.
    pub width: usize,
    pub kind: FieldKind,
}

impl FieldEntry {
    pub const fn new(field: Field, offset: usize, width: usize, kind: FieldKind) -> Self {
        Self {
            field,
            offset,
            width,
            kind,
        }
    }

    /// Entry spanning `count` words starting at word `word`.
    pub const fn words(field: Field, word: usize, count: usize, kind: FieldKind) -> Self {
        Self::new(field, word * 2, count * 2, kind)
    }

    const fn end(&self) -> usize {
        self.offset + self.width
    }
}

const STANDARD_ENTRIES: &[FieldEntry] = &[
    FieldEntry::words(Field::GeneralConfig, 0, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::SerialNumber, 10, 10, FieldKind::Text),
    FieldEntry::words(Field::FirmwareRevision, 23, 4, FieldKind::Text),
    FieldEntry::words(Field::ModelNumber, 27, 20, FieldKind::Text),
    FieldEntry::words(Field::UserSectors28, 60, 2, FieldKind::Uint32),
    FieldEntry::words(Field::SataCapabilities, 76, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::MajorVersion, 80, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::CommandSetSupported, 82, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::CommandSetSupported2, 83, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::CommandSetEnabled, 85, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::CommandSetDefault, 87, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::UserSectors48, 100, 4, FieldKind::Uint64),
    FieldEntry::words(Field::SectorSize, 106, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::Wwn, 108, 4, FieldKind::Wwn),
    FieldEntry::words(Field::LogicalSectorSize, 117, 2, FieldKind::Uint32),
    FieldEntry::words(Field::DataSetManagement, 169, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::RotationRate, 217, 1, FieldKind::Uint16),
    FieldEntry::words(Field::TransportMajor, 222, 1, FieldKind::Bitfield),
    FieldEntry::words(Field::Integrity, 255, 1, FieldKind::Bitfield),
];

/// A checked table of [`FieldEntry`] values.
///
/// Holding a `FieldLayout` means every entry lies inside the record, no two
/// entries share a byte, each field appears once, and every text field has an
/// even width.
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout<'a> {
    entries: &'a [FieldEntry],
}

impl FieldLayout<'static> {
    /// The ATA/ACS IDENTIFY DEVICE layout. Checked during constant evaluation.
    pub const STANDARD: FieldLayout<'static> = match FieldLayout::new(STANDARD_ENTRIES) {
        Ok(layout) => layout,
        Err(_) => panic!("standard IDENTIFY layout is malformed"),
    };
}

impl<'a> FieldLayout<'a> {
    pub const fn new(entries: &'a [FieldEntry]) -> Result<Self, LayoutError> {
        let mut i = 0;
        while i < entries.len() {
            let entry = &entries[i];
            if entry.field.kind() as u8 != entry.kind as u8 {
                return Err(LayoutError::KindMismatch(entry.field));
            }
            match entry.kind.width() {
                Some(width) if width != entry.width => {
                    return Err(LayoutError::WidthMismatch(entry.field, entry.width));
                }
                None if entry.width == 0 => {
                    return Err(LayoutError::WidthMismatch(entry.field, entry.width));
                }
                None if entry.width % 2 != 0 => {
                    return Err(LayoutError::OddTextWidth(entry.field, entry.width));
                }
                _ => {}
            }
            if entry.offset >= IDENTIFY_SIZE || entry.width > IDENTIFY_SIZE - entry.offset {
                return Err(LayoutError::OutOfBounds(entry.field));
            }

            let mut j = 0;
            while j < i {
                let other = &entries[j];
                if field_eq(entry.field, other.field) {
                    return Err(LayoutError::DuplicateField(entry.field));
                }
                if entry.offset < other.end() && other.offset < entry.end() {
                    return Err(LayoutError::Overlap(other.field, entry.field));
                }
                j += 1;
            }
            i += 1;
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &'a [FieldEntry] {
        self.entries
    }

    pub fn get(&self, field: Field) -> Option<&'a FieldEntry> {
        self.entries.iter().find(|entry| entry.field == field)
    }
}

impl Default for FieldLayout<'static> {
    fn default() -> Self {
        Self::STANDARD
    }
}

// `PartialEq` is not usable in const fn yet.
const fn field_eq(a: Field, b: Field) -> bool {
    a as u8 == b as u8
}
