use std::io::Read;

use crate::{
    attribute::{
        find_attribute, parse_attributes, Attribute, AttributeInfo, AttributeKind,
        LocalVariableEntry,
    },
    constant_pool::{ClassConstant, ConstantPool, ConstantPoolIndexRaw},
    reader::ClassReader,
    ClassFileParseError,
};

use self::line_table::LineNumberTable;

pub mod line_table;
pub mod method;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero means that it catches everything
    pub catch_type: ConstantPoolIndexRaw<ClassConstant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub(crate) max_stack: u16,
    pub(crate) max_locals: u16,
    pub(crate) code: Vec<u8>,
    pub(crate) exception_table: Vec<ExceptionEntry>,
    pub(crate) attributes: Vec<AttributeInfo>,
}
impl CodeAttribute {
    pub(crate) fn parse<R: Read>(
        reader: &mut ClassReader<R>,
        pool: &ConstantPool,
    ) -> Result<CodeAttribute, ClassFileParseError> {
        let max_stack = reader.read_u16()?;
        let max_locals = reader.read_u16()?;
        let code_length = reader.read_u32()?;
        let code = reader.read_bytes(code_length)?;

        let exception_count = reader.read_u16()?;
        let mut exception_table = Vec::with_capacity(usize::from(exception_count));
        for _ in 0..exception_count {
            exception_table.push(ExceptionEntry {
                start_pc: reader.read_u16()?,
                end_pc: reader.read_u16()?,
                handler_pc: reader.read_u16()?,
                catch_type: ConstantPoolIndexRaw::new(reader.read_u16()?),
            });
        }

        let attributes = parse_attributes(reader, pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    #[must_use]
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    #[must_use]
    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    #[must_use]
    /// The raw bytecode
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    #[must_use]
    pub fn exception_table(&self) -> &[ExceptionEntry] {
        &self.exception_table
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    #[must_use]
    pub fn line_number_table(&self) -> Option<&LineNumberTable> {
        match find_attribute(&self.attributes, AttributeKind::LineNumberTable)? {
            Attribute::LineNumberTable(table) => Some(table),
            _ => None,
        }
    }

    #[must_use]
    pub fn local_variable_table(&self) -> Option<&[LocalVariableEntry]> {
        match find_attribute(&self.attributes, AttributeKind::LocalVariableTable)? {
            Attribute::LocalVariableTable(vars) => Some(vars.as_slice()),
            _ => None,
        }
    }
}
