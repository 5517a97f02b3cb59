use std::fmt::{Display, Error, Formatter};
use std::ops::{Deref, Not};

use tracing::debug;

use super::error::{QRError, QRResult};
use super::tables::{SpecTables, MODE_INDICATOR_BITS};

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct Version(pub(crate) usize);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(version: usize) -> QRResult<Self> {
        match version {
            1..=40 => Ok(Self(version)),
            _ => Err(QRError::InvalidVersion),
        }
    }

    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    /// Bit length of the character count indicator in byte mode
    pub const fn cci_bits(self) -> usize {
        match self.0 {
            1..=9 => 8,
            _ => 16,
        }
    }

    pub fn all() -> impl Iterator<Item = Version> {
        (1..=40).map(Version)
    }
}

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}


// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum ECLevel {
    L,
    M,
    Q,
    H,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::L => 0,
            Self::M => 1,
            Self::Q => 2,
            Self::H => 3,
        }
    }

    /// Two-bit code carried by the format information
    pub const fn format_bits(self) -> u8 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

impl TryFrom<char> for ECLevel {
    type Error = QRError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'L' => Ok(Self::L),
            'M' => Ok(Self::M),
            'Q' => Ok(Self::Q),
            'H' => Ok(Self::H),
            _ => Err(QRError::InvalidECLevel),
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let c = match self {
            Self::L => 'L',
            Self::M => 'M',
            Self::Q => 'Q',
            Self::H => 'H',
        };
        write!(f, "{c}")
    }
}


// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn select<T>(&self, light: T, dark: T) -> T {
        match self {
            Self::Light => light,
            Self::Dark => dark,
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl From<bool> for Color {
    fn from(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

// Metadata
//------------------------------------------------------------------------------

/// Encoding parameters chosen for a payload.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Metadata {
    pub version: Version,
    pub ec_level: ECLevel,
    pub capacity: usize,
    pub char_count: usize,
    pub cci_bits: usize,
    pub required_bits: usize,
}

impl Metadata {
    /// Picks the smallest version whose byte capacity holds `data_len` bytes at `ecl`. A forced
    /// version is only checked against its own capacity.
    pub fn select(
        tables: &SpecTables,
        data_len: usize,
        ecl: ECLevel,
        forced: Option<Version>,
    ) -> QRResult<Self> {
        let version = match forced {
            Some(v) => {
                if tables.capacity(v, ecl) < data_len {
                    return Err(QRError::DataTooLong);
                }
                v
            }
            None => Version::all()
                .find(|v| tables.capacity(*v, ecl) >= data_len)
                .ok_or(QRError::DataTooLong)?,
        };

        let meta = Self {
            version,
            ec_level: ecl,
            capacity: tables.capacity(version, ecl),
            char_count: data_len,
            cci_bits: version.cci_bits(),
            required_bits: tables.block_layout(version, ecl).required_bits(),
        };
        debug!(version = *version, ec_level = %ecl, "Selected version");
        Ok(meta)
    }

    /// Same as [`Metadata::select`] with the level given by its letter
    pub fn select_with_char(
        tables: &SpecTables,
        data_len: usize,
        ecl: char,
        forced: Option<Version>,
    ) -> QRResult<Self> {
        let ecl = ECLevel::try_from(ecl)?;
        Self::select(tables, data_len, ecl, forced)
    }

    pub fn header_bits(&self) -> usize {
        MODE_INDICATOR_BITS + self.cci_bits
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        writeln!(f, "Version: {}", *self.version)?;
        writeln!(f, "Error correction level: {}", self.ec_level)?;
        writeln!(f, "Mode: Byte")?;
        writeln!(f, "Capacity: {} bytes", self.capacity)?;
        writeln!(f, "Character count: {}", self.char_count)?;
        writeln!(f, "Character count indicator: {} bits", self.cci_bits)?;
        write!(f, "Required bits: {}", self.required_bits)
    }
}

#[cfg(test)]
mod metadata_tests {
    use test_case::test_case;

    use super::{ECLevel, Metadata, Version};
    use crate::common::error::QRError;
    use crate::common::tables::SpecTables;

    #[test_case(0, ECLevel::M, 1)]
    #[test_case(14, ECLevel::M, 1)]
    #[test_case(15, ECLevel::M, 2)]
    #[test_case(17, ECLevel::L, 1)]
    #[test_case(18, ECLevel::L, 2)]
    #[test_case(271, ECLevel::L, 10)]
    #[test_case(2953, ECLevel::L, 40)]
    #[test_case(1273, ECLevel::H, 40)]
    fn test_select_smallest(len: usize, ecl: ECLevel, exp: usize) {
        let meta = Metadata::select(SpecTables::global(), len, ecl, None).unwrap();
        assert_eq!(*meta.version, exp);
        assert_eq!(meta.char_count, len);
        assert!(meta.capacity >= len);
    }

    #[test]
    fn test_select_too_long() {
        let tables = SpecTables::global();
        assert_eq!(Metadata::select(tables, 2954, ECLevel::L, None), Err(QRError::DataTooLong));
        assert_eq!(Metadata::select(tables, 1274, ECLevel::H, None), Err(QRError::DataTooLong));
    }

    #[test]
    fn test_select_forced() {
        let tables = SpecTables::global();
        let meta = Metadata::select(tables, 5, ECLevel::Q, Some(Version(12))).unwrap();
        assert_eq!(*meta.version, 12);
        assert_eq!(meta.cci_bits, 16);
        let res = Metadata::select(tables, 12, ECLevel::Q, Some(Version(1)));
        assert_eq!(res, Err(QRError::DataTooLong));
    }

    #[test]
    fn test_select_with_invalid_char() {
        let res = Metadata::select_with_char(SpecTables::global(), 1_000_000, 'X', None);
        assert_eq!(res, Err(QRError::InvalidECLevel));
    }

    #[test]
    fn test_required_bits() {
        let meta = Metadata::select(SpecTables::global(), 5, ECLevel::Q, Some(Version(5))).unwrap();
        assert_eq!(meta.required_bits, 62 * 8);
        assert_eq!(meta.header_bits(), 12);
    }

    #[test]
    fn test_display() {
        let meta = Metadata::select(SpecTables::global(), 13, ECLevel::L, None).unwrap();
        assert_eq!(
            meta.to_string(),
            "Version: 1\n\
             Error correction level: L\n\
             Mode: Byte\n\
             Capacity: 17 bytes\n\
             Character count: 13\n\
             Character count indicator: 8 bits\n\
             Required bits: 152"
        );
    }
}
