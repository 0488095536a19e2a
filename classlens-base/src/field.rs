use std::io::Read;

use crate::{
    access::FieldAccessFlags,
    attribute::{find_attribute, parse_attributes, Attribute, AttributeInfo, AttributeKind},
    class::ClassFileIndexError,
    constant_pool::{ConstantInfo, ConstantPool, ConstantPoolIndexRaw, Utf8Constant},
    descriptor,
    reader::ClassReader,
    ClassFileParseError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: FieldAccessFlags,
    pub name_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub descriptor_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub attributes: Vec<AttributeInfo>,
}
impl FieldInfo {
    pub(crate) fn parse<R: Read>(
        reader: &mut ClassReader<R>,
        pool: &ConstantPool,
    ) -> Result<FieldInfo, ClassFileParseError> {
        Ok(FieldInfo {
            access_flags: FieldAccessFlags::from_bits_truncate(reader.read_u16()?),
            name_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            descriptor_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            attributes: parse_attributes(reader, pool)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pool: &'a ConstantPool,
    info: &'a FieldInfo,
}
impl<'a> Field<'a> {
    pub(crate) fn new(pool: &'a ConstantPool, info: &'a FieldInfo) -> Self {
        Field { pool, info }
    }

    #[must_use]
    pub fn info(&self) -> &'a FieldInfo {
        self.info
    }

    #[must_use]
    pub fn access_flags(&self) -> FieldAccessFlags {
        self.info.access_flags
    }

    pub fn name(&self) -> Result<&'a str, ClassFileIndexError> {
        self.pool
            .get_text_t(self.info.name_index)
            .ok_or(ClassFileIndexError::InvalidNameIndex(self.info.name_index))
    }

    pub fn raw_descriptor(&self) -> Result<&'a str, ClassFileIndexError> {
        self.pool
            .get_text_t(self.info.descriptor_index)
            .ok_or(ClassFileIndexError::InvalidDescriptorIndex(
                self.info.descriptor_index,
            ))
    }

    /// The human readable type of the field
    pub fn type_name(&self) -> Result<String, ClassFileIndexError> {
        Ok(descriptor::parse_data_type(self.raw_descriptor()?)?)
    }

    /// The constant that a `static final` field is initialized to, if it has one
    pub fn constant_value(&self) -> Result<Option<&'a ConstantInfo>, ClassFileIndexError> {
        match find_attribute(&self.info.attributes, AttributeKind::ConstantValue) {
            Some(Attribute::ConstantValue(index)) => self
                .pool
                .get(*index)
                .map(Some)
                .ok_or(ClassFileIndexError::InvalidConstantValueIndex(*index)),
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.info.access_flags.contains(FieldAccessFlags::STATIC)
    }

    #[must_use]
    pub fn access_string(&self) -> String {
        self.info.access_flags.access_string()
    }
}
