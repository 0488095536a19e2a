#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
// This would be nice to re-enable eventually, but not while in active dev
#![allow(clippy::missing_errors_doc)]
// Shadowing is nice.
#![allow(clippy::shadow_unrelated)]
// Cool idea but highlights entire function and is too aggressive.
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::too_many_lines)]

//! Reading of class files into an immutable in-memory model, along with the queries a debugger
//! frontend needs on top of it: line number <-> bytecode offset mapping, descriptor decoding, and
//! a cache of decoded classes keyed by the id the vm gave them.

use std::fmt;

use constant_pool::{ConstantPoolIndexRaw, Utf8Constant};

pub mod access;
pub mod attribute;
pub mod class;
pub mod code;
pub mod constant_pool;
pub mod data;
pub mod descriptor;
pub mod field;
pub mod id;
pub mod reader;
#[cfg(test)]
mod test_util;
pub mod util;

pub use class::{ClassFile, DecodeConfig};

/// The magic number every class file starts with
pub const CLASS_FILE_MAGIC: u32 = 0xCAFE_BABE;

/// An error that aborts decoding of a class file.
/// Any of these means the entire class is discarded, since the offsets after the point of failure
/// can't be trusted.
#[derive(Debug)]
#[non_exhaustive]
pub enum ClassFileParseError {
    /// The underlying byte source failed
    Io(std::io::Error),
    /// The stream ended before the structure being read was complete
    UnexpectedEof,
    /// The class file did not start with `0xCAFEBABE`
    InvalidMagic(u32),
    /// A constant pool entry had a tag that we don't know how to read, so the size of it is
    /// unknown and nothing after it can be read.
    UnknownConstantTag { index: u16, tag: u8 },
    /// A utf8 constant that was not valid modified utf8
    InvalidUtf8 { index: u16 },
    /// A long or double was at the last slot, and so its second slot would be past the end of the
    /// pool
    WideConstantOverflow { index: u16 },
    /// The name index of an attribute did not point at a utf8 constant
    InvalidAttributeName {
        index: ConstantPoolIndexRaw<Utf8Constant>,
    },
    /// A known attribute's contents did not take up exactly the length that it declared
    AttributeLengthMismatch {
        name: &'static str,
        declared: u32,
        consumed: u64,
    },
    /// There was data after the class attributes
    TrailingData,
}
impl From<std::io::Error> for ClassFileParseError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(err)
        }
    }
}
impl fmt::Display for ClassFileParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error while reading class file: {}", err),
            Self::UnexpectedEof => write!(f, "class file ended unexpectedly"),
            Self::InvalidMagic(magic) => write!(f, "invalid magic number 0x{:08X}", magic),
            Self::UnknownConstantTag { index, tag } => {
                write!(f, "unknown constant pool tag {} at index {}", tag, index)
            }
            Self::InvalidUtf8 { index } => {
                write!(f, "constant pool utf8 entry {} is not valid modified utf8", index)
            }
            Self::WideConstantOverflow { index } => write!(
                f,
                "long/double constant at index {} has no room for its second slot",
                index
            ),
            Self::InvalidAttributeName { index } => write!(
                f,
                "attribute name index {} does not refer to a utf8 constant",
                index.get()
            ),
            Self::AttributeLengthMismatch {
                name,
                declared,
                consumed,
            } => write!(
                f,
                "attribute {} declared a length of {} but its contents took {} bytes",
                name, declared, consumed
            ),
            Self::TrailingData => write!(f, "class file had data after its attributes"),
        }
    }
}
impl std::error::Error for ClassFileParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}
