//! Core TIFF data structures
//!
//! The twelve TIFF 6.0 field types form a closed set. Per-type behavior
//! (native width, swap unit, integer coercion) lives on [`FieldValue`]
//! implementations and is reached through a single [`FieldType::dispatch`],
//! so callers never match on the type code themselves.

use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;

/// Unsigned numerator/denominator pair (RATIONAL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

/// Signed numerator/denominator pair (SRATIONAL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SRational {
    pub numerator: i32,
    pub denominator: i32,
}

/// A native value that one element of a TIFF field decodes to
pub trait FieldValue: Copy + fmt::Debug {
    /// Size of one element on disk
    const WIDTH: usize;
    /// Size of each independently byte-swapped unit within an element
    const SWAP_UNIT: usize;

    /// Builds a value from `WIDTH` bytes already in host order
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Integer view of the value; `None` when no integer exists (x/0)
    fn to_i64(self) -> Option<i64>;
}

macro_rules! impl_field_value {
    ($ty:ty) => {
        impl FieldValue for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const SWAP_UNIT: usize = std::mem::size_of::<$ty>();

            fn from_ne_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::WIDTH]);
                <$ty>::from_ne_bytes(raw)
            }

            fn to_i64(self) -> Option<i64> {
                Some(self as i64)
            }
        }
    };
}

impl_field_value!(u8);
impl_field_value!(i8);
impl_field_value!(u16);
impl_field_value!(i16);
impl_field_value!(u32);
impl_field_value!(i32);
impl_field_value!(f32);
impl_field_value!(f64);

impl FieldValue for Rational {
    const WIDTH: usize = 8;
    const SWAP_UNIT: usize = 4;

    fn from_ne_slice(bytes: &[u8]) -> Self {
        Rational {
            numerator: u32::from_ne_slice(&bytes[0..4]),
            denominator: u32::from_ne_slice(&bytes[4..8]),
        }
    }

    fn to_i64(self) -> Option<i64> {
        (self.numerator as i64).checked_div(self.denominator as i64)
    }
}

impl FieldValue for SRational {
    const WIDTH: usize = 8;
    const SWAP_UNIT: usize = 4;

    fn from_ne_slice(bytes: &[u8]) -> Self {
        SRational {
            numerator: i32::from_ne_slice(&bytes[0..4]),
            denominator: i32::from_ne_slice(&bytes[4..8]),
        }
    }

    fn to_i64(self) -> Option<i64> {
        (self.numerator as i64).checked_div(self.denominator as i64)
    }
}

/// Operation parametrized over the native type of a field
pub trait FieldVisitor {
    type Output;

    fn visit<T: FieldValue>(self) -> Self::Output;
}

/// TIFF field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl FieldType {
    /// Maps an on-disk type code to a field type
    pub fn from_code(code: u16) -> TiffResult<Self> {
        Ok(match code {
            field_types::BYTE => FieldType::Byte,
            field_types::ASCII => FieldType::Ascii,
            field_types::SHORT => FieldType::Short,
            field_types::LONG => FieldType::Long,
            field_types::RATIONAL => FieldType::Rational,
            field_types::SBYTE => FieldType::SByte,
            field_types::UNDEFINED => FieldType::Undefined,
            field_types::SSHORT => FieldType::SShort,
            field_types::SLONG => FieldType::SLong,
            field_types::SRATIONAL => FieldType::SRational,
            field_types::FLOAT => FieldType::Float,
            field_types::DOUBLE => FieldType::Double,
            _ => return Err(TiffError::UnknownFieldType(code)),
        })
    }

    /// On-disk type code
    pub fn code(self) -> u16 {
        match self {
            FieldType::Byte => field_types::BYTE,
            FieldType::Ascii => field_types::ASCII,
            FieldType::Short => field_types::SHORT,
            FieldType::Long => field_types::LONG,
            FieldType::Rational => field_types::RATIONAL,
            FieldType::SByte => field_types::SBYTE,
            FieldType::Undefined => field_types::UNDEFINED,
            FieldType::SShort => field_types::SSHORT,
            FieldType::SLong => field_types::SLONG,
            FieldType::SRational => field_types::SRATIONAL,
            FieldType::Float => field_types::FLOAT,
            FieldType::Double => field_types::DOUBLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Byte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::Short => "SHORT",
            FieldType::Long => "LONG",
            FieldType::Rational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
        }
    }

    /// Runs `visitor` with the native type of this field type
    pub fn dispatch<V: FieldVisitor>(self, visitor: V) -> V::Output {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::Undefined => visitor.visit::<u8>(),
            FieldType::Short => visitor.visit::<u16>(),
            FieldType::Long => visitor.visit::<u32>(),
            FieldType::Rational => visitor.visit::<Rational>(),
            FieldType::SByte => visitor.visit::<i8>(),
            FieldType::SShort => visitor.visit::<i16>(),
            FieldType::SLong => visitor.visit::<i32>(),
            FieldType::SRational => visitor.visit::<SRational>(),
            FieldType::Float => visitor.visit::<f32>(),
            FieldType::Double => visitor.visit::<f64>(),
        }
    }

    /// Size in bytes of one value of this type
    pub fn byte_width(self) -> usize {
        struct Width;
        impl FieldVisitor for Width {
            type Output = usize;
            fn visit<T: FieldValue>(self) -> usize {
                T::WIDTH
            }
        }
        self.dispatch(Width)
    }

    /// Reverses byte order in place, treating `bytes` as an array of this type
    ///
    /// Rationals swap numerator and denominator independently; single-byte
    /// types are left untouched.
    pub fn swap_values(self, bytes: &mut [u8]) {
        struct Swap<'a>(&'a mut [u8]);
        impl FieldVisitor for Swap<'_> {
            type Output = ();
            fn visit<T: FieldValue>(self) {
                let Swap(bytes) = self;
                if T::SWAP_UNIT > 1 {
                    for unit in bytes.chunks_exact_mut(T::SWAP_UNIT) {
                        unit.reverse();
                    }
                }
            }
        }
        self.dispatch(Swap(bytes))
    }

    /// Converts raw bytes from `order` to host order, in place
    pub fn normalize(self, bytes: &mut [u8], order: ByteOrder) {
        if !order.is_host() {
            self.swap_values(bytes);
        }
    }

    /// Coerces host-order `bytes` into integers
    pub fn to_int_vec(self, bytes: &[u8]) -> TiffResult<Vec<i64>> {
        struct Ints<'a>(&'a [u8]);
        impl FieldVisitor for Ints<'_> {
            type Output = TiffResult<Vec<i64>>;
            fn visit<T: FieldValue>(self) -> Self::Output {
                self.0
                    .chunks_exact(T::WIDTH)
                    .map(|chunk| {
                        let value = T::from_ne_slice(chunk);
                        value.to_i64().ok_or_else(|| {
                            TiffError::InvalidEntry(format!("value {:?} has no integer form", value))
                        })
                    })
                    .collect()
            }
        }
        self.dispatch(Ints(bytes))
    }

    /// Decodes host-order `bytes` into a typed view
    pub fn decode(self, bytes: &[u8]) -> FieldValues {
        fn collect<T: FieldValue>(bytes: &[u8]) -> Vec<T> {
            bytes.chunks_exact(T::WIDTH).map(T::from_ne_slice).collect()
        }

        match self {
            FieldType::Byte => FieldValues::Byte(bytes.to_vec()),
            FieldType::Ascii => {
                let text = bytes.split(|b| *b == 0).next().unwrap_or_default();
                FieldValues::Ascii(String::from_utf8_lossy(text).into_owned())
            }
            FieldType::Short => FieldValues::Short(collect(bytes)),
            FieldType::Long => FieldValues::Long(collect(bytes)),
            FieldType::Rational => FieldValues::Rational(collect(bytes)),
            FieldType::SByte => FieldValues::SByte(collect(bytes)),
            FieldType::Undefined => FieldValues::Undefined(bytes.to_vec()),
            FieldType::SShort => FieldValues::SShort(collect(bytes)),
            FieldType::SLong => FieldValues::SLong(collect(bytes)),
            FieldType::SRational => FieldValues::SRational(collect(bytes)),
            FieldType::Float => FieldValues::Float(collect(bytes)),
            FieldType::Double => FieldValues::Double(collect(bytes)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed values of one directory entry
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Byte(Vec<u8>),
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<SRational>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

/// A parsed TIFF file: its header and every directory in the chain
#[derive(Debug)]
pub struct TiffFile {
    pub header: Header,
    pub ifds: Vec<IFD>,
}

impl TiffFile {
    /// Returns the main (first) IFD if available
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    /// Returns the number of IFDs in the TIFF file
    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }
}
