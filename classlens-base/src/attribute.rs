use std::io::Read;

use crate::{
    access::InnerClassAccessFlags,
    code::{line_table::LineNumberTable, CodeAttribute},
    constant_pool::{ClassConstant, ConstantInfo, ConstantPool, ConstantPoolIndexRaw, Utf8Constant},
    reader::ClassReader,
    ClassFileParseError,
};

/// The kinds of attribute that we decode. Anything else is kept as its raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Code,
    ConstantValue,
    Deprecated,
    Exceptions,
    InnerClasses,
    LineNumberTable,
    LocalVariableTable,
    SourceFile,
    Synthetic,
    Unknown,
}
impl AttributeKind {
    #[must_use]
    pub fn from_name(name: &str) -> AttributeKind {
        match name {
            "Code" => AttributeKind::Code,
            "ConstantValue" => AttributeKind::ConstantValue,
            "Deprecated" => AttributeKind::Deprecated,
            "Exceptions" => AttributeKind::Exceptions,
            "InnerClasses" => AttributeKind::InnerClasses,
            "LineNumberTable" => AttributeKind::LineNumberTable,
            "LocalVariableTable" => AttributeKind::LocalVariableTable,
            "SourceFile" => AttributeKind::SourceFile,
            "Synthetic" => AttributeKind::Synthetic,
            _ => AttributeKind::Unknown,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Code => "Code",
            AttributeKind::ConstantValue => "ConstantValue",
            AttributeKind::Deprecated => "Deprecated",
            AttributeKind::Exceptions => "Exceptions",
            AttributeKind::InnerClasses => "InnerClasses",
            AttributeKind::LineNumberTable => "LineNumberTable",
            AttributeKind::LocalVariableTable => "LocalVariableTable",
            AttributeKind::SourceFile => "SourceFile",
            AttributeKind::Synthetic => "Synthetic",
            AttributeKind::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerClassEntry {
    pub inner_class_info_index: ConstantPoolIndexRaw<ClassConstant>,
    /// Zero if the class is not a member
    pub outer_class_info_index: ConstantPoolIndexRaw<ClassConstant>,
    /// Zero if the class is anonymous
    pub inner_name_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub inner_class_access_flags: InnerClassAccessFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub descriptor_index: ConstantPoolIndexRaw<Utf8Constant>,
    /// The local variable slot
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Code(CodeAttribute),
    ConstantValue(ConstantPoolIndexRaw<ConstantInfo>),
    Deprecated,
    /// The classes a method declares that it throws
    Exceptions(Vec<ConstantPoolIndexRaw<ClassConstant>>),
    InnerClasses(Vec<InnerClassEntry>),
    LineNumberTable(LineNumberTable),
    LocalVariableTable(Vec<LocalVariableEntry>),
    SourceFile(ConstantPoolIndexRaw<Utf8Constant>),
    Synthetic,
    Unknown(Vec<u8>),
}
impl Attribute {
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Code(_) => AttributeKind::Code,
            Attribute::ConstantValue(_) => AttributeKind::ConstantValue,
            Attribute::Deprecated => AttributeKind::Deprecated,
            Attribute::Exceptions(_) => AttributeKind::Exceptions,
            Attribute::InnerClasses(_) => AttributeKind::InnerClasses,
            Attribute::LineNumberTable(_) => AttributeKind::LineNumberTable,
            Attribute::LocalVariableTable(_) => AttributeKind::LocalVariableTable,
            Attribute::SourceFile(_) => AttributeKind::SourceFile,
            Attribute::Synthetic => AttributeKind::Synthetic,
            Attribute::Unknown(_) => AttributeKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub name_index: ConstantPoolIndexRaw<Utf8Constant>,
    /// The length in bytes that the attribute declared for its contents
    pub length: u32,
    pub attribute: Attribute,
}
impl AttributeInfo {
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.attribute.kind()
    }
}

/// Find the first attribute of the given kind
pub(crate) fn find_attribute(
    attributes: &[AttributeInfo],
    kind: AttributeKind,
) -> Option<&Attribute> {
    attributes
        .iter()
        .map(|x| &x.attribute)
        .find(|x| x.kind() == kind)
}

pub(crate) fn parse_attributes<R: Read>(
    reader: &mut ClassReader<R>,
    pool: &ConstantPool,
) -> Result<Vec<AttributeInfo>, ClassFileParseError> {
    let count = reader.read_u16()?;
    let mut attributes = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        attributes.push(parse_attribute(reader, pool)?);
    }
    Ok(attributes)
}

pub(crate) fn parse_attribute<R: Read>(
    reader: &mut ClassReader<R>,
    pool: &ConstantPool,
) -> Result<AttributeInfo, ClassFileParseError> {
    let name_index = ConstantPoolIndexRaw::new(reader.read_u16()?);
    let length = reader.read_u32()?;
    let name = pool
        .get_text_t(name_index)
        .ok_or(ClassFileParseError::InvalidAttributeName { index: name_index })?;
    let kind = AttributeKind::from_name(name);

    let start = reader.position();
    let attribute = match kind {
        AttributeKind::Code => Attribute::Code(CodeAttribute::parse(reader, pool)?),
        AttributeKind::ConstantValue => {
            Attribute::ConstantValue(ConstantPoolIndexRaw::new(reader.read_u16()?))
        }
        AttributeKind::Deprecated => Attribute::Deprecated,
        AttributeKind::Exceptions => {
            let count = reader.read_u16()?;
            Attribute::Exceptions(reader.read_u16_table(count, ConstantPoolIndexRaw::new)?)
        }
        AttributeKind::InnerClasses => {
            let count = reader.read_u16()?;
            let mut classes = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                classes.push(InnerClassEntry {
                    inner_class_info_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                    outer_class_info_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                    inner_name_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                    inner_class_access_flags: InnerClassAccessFlags::from_bits_truncate(
                        reader.read_u16()?,
                    ),
                });
            }
            Attribute::InnerClasses(classes)
        }
        AttributeKind::LineNumberTable => {
            Attribute::LineNumberTable(LineNumberTable::parse(reader)?)
        }
        AttributeKind::LocalVariableTable => {
            let count = reader.read_u16()?;
            let mut variables = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                variables.push(LocalVariableEntry {
                    start_pc: reader.read_u16()?,
                    length: reader.read_u16()?,
                    name_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                    descriptor_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                    index: reader.read_u16()?,
                });
            }
            Attribute::LocalVariableTable(variables)
        }
        AttributeKind::SourceFile => {
            Attribute::SourceFile(ConstantPoolIndexRaw::new(reader.read_u16()?))
        }
        AttributeKind::Synthetic => Attribute::Synthetic,
        AttributeKind::Unknown => {
            tracing::trace!("Skipping attribute {} ({} bytes)", name, length);
            Attribute::Unknown(reader.read_bytes(length)?)
        }
    };

    let consumed = reader.position() - start;
    if consumed != u64::from(length) {
        return Err(ClassFileParseError::AttributeLengthMismatch {
            name: kind.name(),
            declared: length,
            consumed,
        });
    }

    Ok(AttributeInfo {
        name_index,
        length,
        attribute,
    })
}
