//! Field and method descriptors, like `[Ljava/lang/String;` and `(IJ)V`.
//!
//! Everything that displays a descriptor goes through [`DescriptorType`], so that the list of
//! parameters and the human readable signature always agree on where one parameter ends and the
//! next begins.

use std::{fmt, num::NonZeroUsize};

use itertools::Itertools;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DescriptorError {
    /// There was nothing to parse
    Empty,
    /// A character that does not start any type
    UnknownType(char),
    /// `V` was used somewhere other than as the return type
    UnexpectedVoid,
    /// An `L` without the `;` that ends the class name
    UnterminatedClassName,
    /// A `[` at the end of the input, with no component type
    DanglingArray,
    /// A method descriptor that did not start with `(`
    MissingOpenParen,
    /// A method descriptor with no `)` after the parameters
    MissingCloseParen,
    /// There was more text after a complete descriptor
    TrailingCharacters(String),
}
impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::Empty => write!(f, "empty descriptor"),
            DescriptorError::UnknownType(c) => write!(f, "unknown descriptor type '{}'", c),
            DescriptorError::UnexpectedVoid => write!(f, "void is only allowed as a return type"),
            DescriptorError::UnterminatedClassName => {
                write!(f, "class name in descriptor is missing its ';'")
            }
            DescriptorError::DanglingArray => write!(f, "array descriptor has no component type"),
            DescriptorError::MissingOpenParen => write!(f, "method descriptor must start with '('"),
            DescriptorError::MissingCloseParen => {
                write!(f, "method descriptor is missing its ')'")
            }
            DescriptorError::TrailingCharacters(rest) => {
                write!(f, "unexpected text after descriptor: {:?}", rest)
            }
        }
    }
}
impl std::error::Error for DescriptorError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorTypeBasic {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    /// The internal name of the class, like `java/lang/String`
    Class(String),
    Short,
    Boolean,
}
impl DescriptorTypeBasic {
    fn from_char(c: char) -> Option<DescriptorTypeBasic> {
        Some(match c {
            'B' => DescriptorTypeBasic::Byte,
            'C' => DescriptorTypeBasic::Char,
            'D' => DescriptorTypeBasic::Double,
            'F' => DescriptorTypeBasic::Float,
            'I' => DescriptorTypeBasic::Int,
            'J' => DescriptorTypeBasic::Long,
            'S' => DescriptorTypeBasic::Short,
            'Z' => DescriptorTypeBasic::Boolean,
            _ => return None,
        })
    }

    /// The keyword for primitive types
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            DescriptorTypeBasic::Byte => "byte",
            DescriptorTypeBasic::Char => "char",
            DescriptorTypeBasic::Double => "double",
            DescriptorTypeBasic::Float => "float",
            DescriptorTypeBasic::Int => "int",
            DescriptorTypeBasic::Long => "long",
            DescriptorTypeBasic::Class(_) => return None,
            DescriptorTypeBasic::Short => "short",
            DescriptorTypeBasic::Boolean => "boolean",
        })
    }
}
impl fmt::Display for DescriptorTypeBasic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorTypeBasic::Class(name) => f.write_str(&parse_class_name(name)),
            _ => f.write_str(self.name().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    Basic(DescriptorTypeBasic),
    Array {
        level: NonZeroUsize,
        component: DescriptorTypeBasic,
    },
}
impl DescriptorType {
    /// Parse a descriptor which must be exactly one type
    pub fn parse(desc: &str) -> Result<DescriptorType, DescriptorError> {
        let (typ, rest) = DescriptorType::parse_prefix(desc)?;
        if rest.is_empty() {
            Ok(typ)
        } else {
            Err(DescriptorError::TrailingCharacters(rest.to_owned()))
        }
    }

    /// Parse a single type from the start of `desc`, returning the text after it
    pub fn parse_prefix(desc: &str) -> Result<(DescriptorType, &str), DescriptorError> {
        let rest = desc.trim_start_matches('[');
        let level = desc.len() - rest.len();

        let first = match rest.chars().next() {
            Some(first) => first,
            None if level == 0 => return Err(DescriptorError::Empty),
            None => return Err(DescriptorError::DanglingArray),
        };

        let (component, rest) = match first {
            'L' => {
                let end = rest
                    .find(';')
                    .ok_or(DescriptorError::UnterminatedClassName)?;
                let name = &rest[1..end];
                if name.is_empty() {
                    return Err(DescriptorError::UnterminatedClassName);
                }
                (
                    DescriptorTypeBasic::Class(name.to_owned()),
                    &rest[end + 1..],
                )
            }
            'V' => return Err(DescriptorError::UnexpectedVoid),
            c => (
                DescriptorTypeBasic::from_char(c).ok_or(DescriptorError::UnknownType(c))?,
                &rest[c.len_utf8()..],
            ),
        };

        let typ = match NonZeroUsize::new(level) {
            Some(level) => DescriptorType::Array { level, component },
            None => DescriptorType::Basic(component),
        };
        Ok((typ, rest))
    }

    /// The number of local variable slots that a value of this type takes up
    #[must_use]
    pub fn word_size(&self) -> usize {
        match self {
            DescriptorType::Basic(DescriptorTypeBasic::Double | DescriptorTypeBasic::Long) => 2,
            _ => 1,
        }
    }
}
impl fmt::Display for DescriptorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorType::Basic(basic) => fmt::Display::fmt(basic, f),
            DescriptorType::Array { level, component } => {
                fmt::Display::fmt(component, f)?;
                for _ in 0..level.get() {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    parameters: SmallVec<[DescriptorType; 4]>,
    /// None represents void
    return_type: Option<DescriptorType>,
}
impl MethodDescriptor {
    pub fn parse(desc: &str) -> Result<MethodDescriptor, DescriptorError> {
        if desc.is_empty() {
            return Err(DescriptorError::Empty);
        }
        let mut rest = desc
            .strip_prefix('(')
            .ok_or(DescriptorError::MissingOpenParen)?;

        let mut parameters = SmallVec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            if rest.is_empty() {
                return Err(DescriptorError::MissingCloseParen);
            }

            let (param, after) = DescriptorType::parse_prefix(rest)?;
            parameters.push(param);
            rest = after;
        }

        let return_type = if let Some(after) = rest.strip_prefix('V') {
            if !after.is_empty() {
                return Err(DescriptorError::TrailingCharacters(after.to_owned()));
            }
            None
        } else {
            Some(DescriptorType::parse(rest)?)
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &[DescriptorType] {
        self.parameters.as_slice()
    }

    #[must_use]
    pub fn return_type(&self) -> Option<&DescriptorType> {
        self.return_type.as_ref()
    }

    /// The number of local variable slots the parameters take up, not counting `this`
    #[must_use]
    pub fn parameter_words(&self) -> usize {
        self.parameters.iter().map(DescriptorType::word_size).sum()
    }

    /// The display names of the parameters, in order
    #[must_use]
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn return_type_name(&self) -> String {
        match &self.return_type {
            Some(typ) => typ.to_string(),
            None => "void".to_owned(),
        }
    }

    /// Human readable form, listing the parameters and then the return type on its own line
    #[must_use]
    pub fn signature(&self) -> String {
        let params = if self.parameters.is_empty() {
            "None".to_owned()
        } else {
            self.parameters.iter().join(", ")
        };
        format!("Params: {}\n\t\t\tReturn: {}", params, self.return_type_name())
    }
}

/// Get the display name of a field descriptor, or `void` for `V`
pub fn parse_data_type(desc: &str) -> Result<String, DescriptorError> {
    if desc == "V" {
        return Ok("void".to_owned());
    }

    DescriptorType::parse(desc).map(|typ| typ.to_string())
}

/// The display names of a method descriptor's parameters.
/// A method without parameters gives an empty list.
pub fn parse_parameters(desc: &str) -> Result<Vec<String>, DescriptorError> {
    MethodDescriptor::parse(desc).map(|desc| desc.parameter_names())
}

/// The number of local variable slots a method descriptor's parameters take up
pub fn parameter_count(desc: &str) -> Result<usize, DescriptorError> {
    MethodDescriptor::parse(desc).map(|desc| desc.parameter_words())
}

pub fn return_type(desc: &str) -> Result<String, DescriptorError> {
    MethodDescriptor::parse(desc).map(|desc| desc.return_type_name())
}

/// See [`MethodDescriptor::signature`]
pub fn parse_signature(desc: &str) -> Result<String, DescriptorError> {
    MethodDescriptor::parse(desc).map(|desc| desc.signature())
}

/// Convert an internal class name (`java/lang/String`) into the dotted form
#[must_use]
pub fn parse_class_name(name: &str) -> String {
    name.replace('/', ".")
}
