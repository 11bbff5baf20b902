//! # smart-identify
//! A pure Rust decoder for the 512-byte ATA IDENTIFY DEVICE record, the
//! identification half of a drive's SMART data.
//!
//! ## Current Scope
//! *   Serial number, firmware revision and model number (word-swapped ASCII).
//! *   Nominal media rotation rate and World Wide Name.
//! *   Capacity, sector sizes, ATA/SATA versions, SMART and TRIM support.
//!
//! Issuing the IDENTIFY command is left to the caller: any ioctl, SCSI ATA
//! pass-through or dump file that yields the raw 512 bytes will do.
//!
//! ```
//! let mut bytes = [0u8; 512];
//! bytes[434] = 0x01; // word 217: non-rotating media
//! let identity = smart_identify::decode(&bytes).unwrap();
//! assert_eq!(identity.rotation_rate, 1);
//! assert!(identity.wwn.is_none());
//! ```

pub mod ata;
pub mod error;

pub use ata::decode::{DecodedIdentity, Decoder, Integrity, MediaRotation};
pub use ata::layout::{Field, FieldEntry, FieldKind, FieldLayout};
pub use ata::wwn::{Naa, Wwn};
pub use ata::{RawRecord, IDENTIFY_SIZE};
pub use error::{IdentifyError, LayoutError};

/// Decodes a raw IDENTIFY DEVICE response with the standard layout.
///
/// # Returns
/// The decoded identity, or [`IdentifyError::InvalidLength`] if `bytes` is not
/// exactly 512 bytes long. Field contents never cause an error.
pub fn decode(bytes: &[u8]) -> Result<DecodedIdentity, IdentifyError> {
    let record = RawRecord::from_slice(bytes)?;
    Ok(Decoder::standard().decode(&record))
}
