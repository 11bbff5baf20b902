//! World Wide Name, IDENTIFY DEVICE words 108-111.

use serde::{Serialize, Serializer};
use std::fmt;

const OUI_MASK: u64 = 0xff_ffff;
const REGISTERED_VENDOR_MASK: u64 = 0xf_ffff_ffff;

/// Name Address Authority, the top nibble of a WWN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naa {
    /// 2h: 12-bit vendor field, OUI, 24-bit vendor field.
    IeeeExtended,
    /// 5h: OUI followed by a 36-bit vendor field.
    IeeeRegistered,
    /// 6h: first 64 bits split as IEEE Registered, extension not carried.
    IeeeRegisteredExtended,
    /// Any other non-zero authority. Passed through undecoded.
    Other(u8),
}

impl From<u8> for Naa {
    fn from(code: u8) -> Self {
        match code {
            0x2 => Naa::IeeeExtended,
            0x5 => Naa::IeeeRegistered,
            0x6 => Naa::IeeeRegisteredExtended,
            n => Naa::Other(n),
        }
    }
}

/// A 64-bit World Wide Name reported by a device that supports one.
///
/// There is no all-zero `Wwn`: an NAA of 0 means the device has no WWN and
/// is represented as `None` by [`Wwn::from_words`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wwn(u64);

impl Wwn {
    /// Builds a WWN from words 108..=111; `words[0]` is the most significant.
    pub fn from_words(words: [u16; 4]) -> Option<Self> {
        let value = words
            .iter()
            .fold(0u64, |acc, &word| (acc << 16) | u64::from(word));
        Self::from_u64(value)
    }

    pub fn from_u64(value: u64) -> Option<Self> {
        if value >> 60 == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Raw 4-bit NAA code.
    pub fn naa_code(self) -> u8 {
        (self.0 >> 60) as u8
    }

    pub fn naa(self) -> Naa {
        Naa::from(self.naa_code())
    }

    pub fn oui(self) -> Option<u32> {
        match self.naa() {
            Naa::IeeeExtended => Some(((self.0 >> 24) & OUI_MASK) as u32),
            Naa::IeeeRegistered | Naa::IeeeRegisteredExtended => {
                Some(((self.0 >> 36) & OUI_MASK) as u32)
            }
            Naa::Other(_) => None,
        }
    }

    /// The 36 vendor-assigned bits. For IEEE Extended names the two vendor
    /// fields are joined, upper field first.
    pub fn vendor_specific_id(self) -> Option<u64> {
        match self.naa() {
            Naa::IeeeExtended => {
                let upper = (self.0 >> 48) & 0xfff;
                let lower = self.0 & OUI_MASK;
                Some((upper << 24) | lower)
            }
            Naa::IeeeRegistered | Naa::IeeeRegisteredExtended => {
                Some(self.0 & REGISTERED_VENDOR_MASK)
            }
            Naa::Other(_) => None,
        }
    }
}

/// Groups the digits at the authority, OUI and vendor field boundaries,
/// e.g. `5 002538 85009397f`.
impl fmt::Display for Wwn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let naa = self.naa_code();
        match (self.naa(), self.oui(), self.vendor_specific_id()) {
            (Naa::IeeeExtended, Some(oui), Some(_)) => write!(
                f,
                "{:x} {:03x} {:06x} {:06x}",
                naa,
                (self.0 >> 48) & 0xfff,
                oui,
                self.0 & OUI_MASK
            ),
            (_, Some(oui), Some(vendor)) => write!(f, "{:x} {:06x} {:09x}", naa, oui, vendor),
            _ => write!(f, "{:x} {:015x}", naa, self.0 & 0x0fff_ffff_ffff_ffff),
        }
    }
}

impl Serialize for Wwn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
