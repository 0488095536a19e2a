use std::io::Read;

use crate::{
    access::MethodAccessFlags,
    attribute::{find_attribute, parse_attributes, Attribute, AttributeInfo, AttributeKind},
    class::ClassFileIndexError,
    constant_pool::{ConstantPool, ConstantPoolIndexRaw, Utf8Constant},
    descriptor::{self, MethodDescriptor},
    id::MethodIndex,
    reader::ClassReader,
    ClassFileParseError,
};

use super::{
    line_table::{LineNumberTable, SteppingInfo},
    CodeAttribute,
};

/// A method as it is stored in the class file
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlags,
    pub name_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub descriptor_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub attributes: Vec<AttributeInfo>,
}
impl MethodInfo {
    pub(crate) fn parse<R: Read>(
        reader: &mut ClassReader<R>,
        pool: &ConstantPool,
    ) -> Result<MethodInfo, ClassFileParseError> {
        Ok(MethodInfo {
            access_flags: MethodAccessFlags::from_bits_truncate(reader.read_u16()?),
            name_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            descriptor_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            attributes: parse_attributes(reader, pool)?,
        })
    }
}

/// A local variable from the method's `LocalVariableTable`, with its name and type resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: String,
    /// The human readable type, like `java.lang.String[]`
    pub type_name: String,
    pub start_pc: u16,
    /// The number of bytes of code, starting at `start_pc`, where the variable has a value
    pub length: u16,
    /// The local variable slot
    pub index: u16,
}

/// A method along with the constant pool of the class it is in, so that its names can be
/// resolved.
#[derive(Debug, Clone, Copy)]
pub struct Method<'a> {
    pool: &'a ConstantPool,
    info: &'a MethodInfo,
    index: MethodIndex,
}
impl<'a> Method<'a> {
    pub(crate) fn new(pool: &'a ConstantPool, info: &'a MethodInfo, index: MethodIndex) -> Self {
        Method { pool, info, index }
    }

    #[must_use]
    /// The position of the method within the class' methods
    pub fn index(&self) -> MethodIndex {
        self.index
    }

    #[must_use]
    pub fn info(&self) -> &'a MethodInfo {
        self.info
    }

    #[must_use]
    pub fn access_flags(&self) -> MethodAccessFlags {
        self.info.access_flags
    }

    #[must_use]
    pub fn attributes(&self) -> &'a [AttributeInfo] {
        &self.info.attributes
    }

    pub fn name(&self) -> Result<&'a str, ClassFileIndexError> {
        self.pool
            .get_text_t(self.info.name_index)
            .ok_or(ClassFileIndexError::InvalidNameIndex(self.info.name_index))
    }

    /// The descriptor as it is in the class file, like `(I)V`
    pub fn raw_descriptor(&self) -> Result<&'a str, ClassFileIndexError> {
        self.pool
            .get_text_t(self.info.descriptor_index)
            .ok_or(ClassFileIndexError::InvalidDescriptorIndex(
                self.info.descriptor_index,
            ))
    }

    pub fn descriptor(&self) -> Result<MethodDescriptor, ClassFileIndexError> {
        Ok(MethodDescriptor::parse(self.raw_descriptor()?)?)
    }

    /// The human readable form of the descriptor
    pub fn signature(&self) -> Result<String, ClassFileIndexError> {
        self.descriptor().map(|desc| desc.signature())
    }

    pub fn parameters(&self) -> Result<Vec<String>, ClassFileIndexError> {
        self.descriptor().map(|desc| desc.parameter_names())
    }

    pub fn return_type(&self) -> Result<String, ClassFileIndexError> {
        self.descriptor().map(|desc| desc.return_type_name())
    }

    #[must_use]
    /// The code of the method. Native and abstract methods don't have any.
    pub fn code(&self) -> Option<&'a CodeAttribute> {
        match find_attribute(&self.info.attributes, AttributeKind::Code)? {
            Attribute::Code(code) => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn line_number_table(&self) -> Option<&'a LineNumberTable> {
        self.code().and_then(CodeAttribute::line_number_table)
    }

    #[must_use]
    /// The `(line, offset)` pairs that a breakpoint can be placed at
    pub fn breakable_lines(&self) -> Vec<(u16, u16)> {
        self.line_number_table()
            .map(|table| table.breakable_lines().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains_line(&self, line: u16) -> bool {
        self.line_number_table()
            .map_or(false, |table| table.contains_line(line))
    }

    #[must_use]
    pub fn code_offset_for_line(&self, line: u16) -> Option<u16> {
        self.line_number_table()?.offset_for_line(line)
    }

    #[must_use]
    /// See [`LineNumberTable::stepping_info`]
    pub fn stepping_info(&self, offset: u32) -> SteppingInfo {
        self.line_number_table()
            .map(|table| table.stepping_info(offset))
            .unwrap_or_default()
    }

    /// The local variables from the debug information, if the class was compiled with it
    pub fn local_variables(&self) -> Result<Vec<LocalVariable>, ClassFileIndexError> {
        let entries = match self.code().and_then(CodeAttribute::local_variable_table) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        entries
            .iter()
            .map(|entry| -> Result<LocalVariable, ClassFileIndexError> {
                let name = self
                    .pool
                    .get_text_t(entry.name_index)
                    .ok_or(ClassFileIndexError::InvalidNameIndex(entry.name_index))?;
                let desc = self.pool.get_text_t(entry.descriptor_index).ok_or(
                    ClassFileIndexError::InvalidDescriptorIndex(entry.descriptor_index),
                )?;

                Ok(LocalVariable {
                    name: name.to_owned(),
                    type_name: descriptor::parse_data_type(desc)?,
                    start_pc: entry.start_pc,
                    length: entry.length,
                    index: entry.index,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.info.access_flags.contains(MethodAccessFlags::STATIC)
    }

    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        find_attribute(&self.info.attributes, AttributeKind::Deprecated).is_some()
    }

    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.info.access_flags.contains(MethodAccessFlags::SYNTHETIC)
            || find_attribute(&self.info.attributes, AttributeKind::Synthetic).is_some()
    }

    /// The number of local variable slots that the arguments take up, including `this` for
    /// instance methods
    pub fn arg_count(&self) -> Result<usize, ClassFileIndexError> {
        let words = self.descriptor()?.parameter_words();
        Ok(if self.is_static() { words } else { words + 1 })
    }

    /// The internal names of the classes the method declares that it throws
    pub fn exceptions(&self) -> Result<Vec<&'a str>, ClassFileIndexError> {
        let classes = match find_attribute(&self.info.attributes, AttributeKind::Exceptions) {
            Some(Attribute::Exceptions(classes)) => classes,
            _ => return Ok(Vec::new()),
        };

        classes
            .iter()
            .map(|&class| {
                self.pool
                    .class_name(class)
                    .ok_or(ClassFileIndexError::InvalidExceptionClassIndex(class))
            })
            .collect()
    }

    #[must_use]
    pub fn access_string(&self) -> String {
        self.info.access_flags.access_string()
    }
}
