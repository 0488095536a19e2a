use std::{fmt, io::Read};

use crate::{
    access::ClassAccessFlags,
    attribute::{find_attribute, parse_attributes, Attribute, AttributeInfo, AttributeKind},
    code::method::{LocalVariable, Method, MethodInfo},
    constant_pool::{
        ClassConstant, ConstantInfo, ConstantPool, ConstantPoolIndexRaw, Utf8Constant,
    },
    data::class_file_loader::ClassFileData,
    descriptor::{parse_class_name, DescriptorError},
    field::{Field, FieldInfo},
    id::{is_array_class, ClassId, ClassStatus, MethodIndex},
    reader::ClassReader,
    util, ClassFileParseError, CLASS_FILE_MAGIC,
};

/// A cross reference inside of a class file that did not point at what it should
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ClassFileIndexError {
    InvalidThisClassIndex,
    InvalidThisClassNameIndex,
    InvalidSuperClassIndex,
    InvalidSuperClassNameIndex,
    InvalidInterfaceIndex(ConstantPoolIndexRaw<ClassConstant>),
    InvalidNameIndex(ConstantPoolIndexRaw<Utf8Constant>),
    InvalidDescriptorIndex(ConstantPoolIndexRaw<Utf8Constant>),
    InvalidDescriptor(DescriptorError),
    InvalidConstantValueIndex(ConstantPoolIndexRaw<ConstantInfo>),
    InvalidExceptionClassIndex(ConstantPoolIndexRaw<ClassConstant>),
    InvalidSourceFileIndex(ConstantPoolIndexRaw<Utf8Constant>),
}
impl From<DescriptorError> for ClassFileIndexError {
    fn from(err: DescriptorError) -> Self {
        Self::InvalidDescriptor(err)
    }
}
impl fmt::Display for ClassFileIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThisClassIndex => write!(f, "this class index is not a class constant"),
            Self::InvalidThisClassNameIndex => write!(f, "this class name is not a utf8 constant"),
            Self::InvalidSuperClassIndex => {
                write!(f, "super class index is not a class constant")
            }
            Self::InvalidSuperClassNameIndex => {
                write!(f, "super class name is not a utf8 constant")
            }
            Self::InvalidInterfaceIndex(i) => {
                write!(f, "interface index {:?} is not a class constant", i)
            }
            Self::InvalidNameIndex(i) => write!(f, "name index {:?} is not a utf8 constant", i),
            Self::InvalidDescriptorIndex(i) => {
                write!(f, "descriptor index {:?} is not a utf8 constant", i)
            }
            Self::InvalidDescriptor(err) => write!(f, "invalid descriptor: {}", err),
            Self::InvalidConstantValueIndex(i) => {
                write!(f, "constant value index {:?} does not exist", i)
            }
            Self::InvalidExceptionClassIndex(i) => {
                write!(f, "exception index {:?} is not a class constant", i)
            }
            Self::InvalidSourceFileIndex(i) => {
                write!(f, "source file index {:?} is not a utf8 constant", i)
            }
        }
    }
}
impl std::error::Error for ClassFileIndexError {}

/// Options for decoding a class file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Whether bytes after the class attributes are ignored rather than being an error
    pub allow_trailing_data: bool,
}

/// A decoded class file. This does not change after it has been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub(crate) minor_version: u16,
    pub(crate) major_version: u16,
    pub(crate) constant_pool: ConstantPool,
    pub(crate) access_flags: ClassAccessFlags,
    pub(crate) this_class: ConstantPoolIndexRaw<ClassConstant>,
    /// Zero if there is no super class
    pub(crate) super_class: ConstantPoolIndexRaw<ClassConstant>,
    pub(crate) interfaces: Vec<ConstantPoolIndexRaw<ClassConstant>>,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) attributes: Vec<AttributeInfo>,
}
impl ClassFile {
    pub fn parse<R: Read>(source: R) -> Result<ClassFile, ClassFileParseError> {
        ClassFile::parse_with(source, DecodeConfig::default())
    }

    pub fn from_bytes(data: &[u8]) -> Result<ClassFile, ClassFileParseError> {
        ClassFile::parse(data)
    }

    /// Decode a class file in a single pass over `source`.
    /// On error, everything that was decoded is thrown away.
    pub fn parse_with<R: Read>(
        source: R,
        config: DecodeConfig,
    ) -> Result<ClassFile, ClassFileParseError> {
        let mut reader = ClassReader::new(source);

        let magic = reader.read_u32()?;
        if magic != CLASS_FILE_MAGIC {
            return Err(ClassFileParseError::InvalidMagic(magic));
        }

        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;
        let constant_pool = ConstantPool::parse(&mut reader)?;
        let access_flags = ClassAccessFlags::from_bits_truncate(reader.read_u16()?);
        let this_class = ConstantPoolIndexRaw::new(reader.read_u16()?);
        let super_class = ConstantPoolIndexRaw::new(reader.read_u16()?);

        let interface_count = reader.read_u16()?;
        let interfaces = reader.read_u16_table(interface_count, ConstantPoolIndexRaw::new)?;

        let field_count = reader.read_u16()?;
        let mut fields = Vec::with_capacity(usize::from(field_count));
        for _ in 0..field_count {
            fields.push(FieldInfo::parse(&mut reader, &constant_pool)?);
        }

        let method_count = reader.read_u16()?;
        let mut methods = Vec::with_capacity(usize::from(method_count));
        for _ in 0..method_count {
            methods.push(MethodInfo::parse(&mut reader, &constant_pool)?);
        }

        let attributes = parse_attributes(&mut reader, &constant_pool)?;

        if !config.allow_trailing_data && !reader.is_at_end()? {
            return Err(ClassFileParseError::TrailingData);
        }

        tracing::trace!(
            "Decoded class file: {} constants, {} fields, {} methods, {} bytes",
            constant_pool.len(),
            fields.len(),
            methods.len(),
            reader.position()
        );

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    #[must_use]
    /// (major, minor)
    pub fn version(&self) -> (u16, u16) {
        (self.major_version, self.minor_version)
    }

    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    /// The internal name of the class, like `java/lang/String`
    pub fn this_class_name(&self) -> Result<&str, ClassFileIndexError> {
        let this_class = self
            .constant_pool
            .get_t(self.this_class)
            .ok_or(ClassFileIndexError::InvalidThisClassIndex)?;
        self.constant_pool
            .get_text_t(this_class.name_index)
            .ok_or(ClassFileIndexError::InvalidThisClassNameIndex)
    }

    pub fn super_class_name(&self) -> Result<Option<&str>, ClassFileIndexError> {
        // There is no base class
        // Only java/lang/Object should have no base class, but we don't do that verification here
        if self.super_class.is_zero() {
            return Ok(None);
        }

        let super_class = self
            .constant_pool
            .get_t(self.super_class)
            .ok_or(ClassFileIndexError::InvalidSuperClassIndex)?;
        self.constant_pool
            .get_text_t(super_class.name_index)
            .map(Some)
            .ok_or(ClassFileIndexError::InvalidSuperClassNameIndex)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>, ClassFileIndexError> {
        self.interfaces
            .iter()
            .map(|&index| {
                self.constant_pool
                    .class_name(index)
                    .ok_or(ClassFileIndexError::InvalidInterfaceIndex(index))
            })
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> + '_ {
        self.fields
            .iter()
            .map(move |info| Field::new(&self.constant_pool, info))
    }

    pub fn methods(&self) -> impl Iterator<Item = Method<'_>> + '_ {
        // The methods count is a u16, so there are never more than that
        (0..=MethodIndex::MAX)
            .zip(self.methods.iter())
            .map(move |(index, info)| Method::new(&self.constant_pool, info, index))
    }

    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn method_by_index(&self, index: MethodIndex) -> Option<Method<'_>> {
        self.methods
            .get(usize::from(index))
            .map(|info| Method::new(&self.constant_pool, info, index))
    }

    /// Find the method with exactly this name and descriptor
    #[must_use]
    pub fn method_by_name(&self, name: &str, descriptor: &str) -> Option<Method<'_>> {
        self.methods().find(|method| {
            method.name().ok() == Some(name) && method.raw_descriptor().ok() == Some(descriptor)
        })
    }

    /// The first method, in declaration order, which has code on the given line
    #[must_use]
    pub fn method_by_line_number(&self, line: u16) -> Option<Method<'_>> {
        self.methods().find(|method| method.contains_line(line))
    }

    #[must_use]
    pub fn contains_line(&self, line: u16) -> bool {
        self.method_by_line_number(line).is_some()
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute_by_kind(&self, kind: AttributeKind) -> Option<&Attribute> {
        find_attribute(&self.attributes, kind)
    }

    /// The name of the source file the class was compiled from, if it was recorded
    pub fn source_file(&self) -> Result<Option<&str>, ClassFileIndexError> {
        match self.attribute_by_kind(AttributeKind::SourceFile) {
            Some(Attribute::SourceFile(index)) => self
                .constant_pool
                .get_text_t(*index)
                .map(Some)
                .ok_or(ClassFileIndexError::InvalidSourceFileIndex(*index)),
            _ => Ok(None),
        }
    }

    /// `None` if there is no method at that index
    pub fn local_variables_for_method(
        &self,
        index: MethodIndex,
    ) -> Result<Option<Vec<LocalVariable>>, ClassFileIndexError> {
        self.method_by_index(index)
            .map(|method| method.local_variables())
            .transpose()
    }
}

/// The kind of type, numbered the way the debugger wire protocol numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Class = 1,
    Interface = 2,
    Array = 3,
}
impl TypeTag {
    #[must_use]
    pub fn from_access_flags(flags: ClassAccessFlags) -> TypeTag {
        if flags.contains(ClassAccessFlags::INTERFACE) {
            TypeTag::Interface
        } else {
            TypeTag::Class
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<TypeTag> {
        is_array_class(name).then(|| TypeTag::Array)
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A class that has been decoded from a file and registered under the id the vm gave it
#[derive(Debug, Clone)]
pub struct LoadedClass {
    pub(crate) id: ClassId,
    pub(crate) status: ClassStatus,
    /// The internal name, like `java/lang/String`
    pub(crate) name: String,
    pub(crate) signature: String,
    pub(crate) type_tag: TypeTag,
    /// Where the class file was loaded from
    pub(crate) source_path: String,
    pub(crate) class_file: ClassFile,
}
impl LoadedClass {
    pub fn new(
        id: ClassId,
        status: ClassStatus,
        data: ClassFileData,
    ) -> Result<LoadedClass, ClassFileIndexError> {
        let ClassFileData {
            source,
            class_file,
        } = data;
        let name = class_file.this_class_name()?.to_owned();
        Ok(LoadedClass {
            id,
            status,
            signature: util::format_class_as_object_desc(&name),
            type_tag: TypeTag::from_access_flags(class_file.access_flags),
            name,
            source_path: source,
            class_file,
        })
    }

    /// Register the class under a different internal name than the one in its class file
    pub(crate) fn set_name(&mut self, name: String) {
        self.signature = util::format_class_as_object_desc(&name);
        self.name = name;
    }

    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> ClassStatus {
        self.status
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    /// The name with dots, like `java.lang.String`
    pub fn source_name(&self) -> String {
        parse_class_name(&self.name)
    }

    #[must_use]
    /// The name without its package, like `String`
    pub fn base_name(&self) -> &str {
        util::base_name(&self.name)
    }

    #[must_use]
    /// The name as a descriptor, like `Ljava/lang/String;`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    #[must_use]
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    #[must_use]
    pub fn class_file(&self) -> &ClassFile {
        &self.class_file
    }
}

/// An array class. These have no class file, so all we know is their name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayClass {
    pub(crate) id: ClassId,
    pub(crate) status: ClassStatus,
    /// The descriptor of the array, like `[Ljava/lang/String;`
    pub(crate) name: String,
}
impl ArrayClass {
    #[must_use]
    pub fn new(id: ClassId, status: ClassStatus, name: String) -> ArrayClass {
        ArrayClass { id, status, name }
    }

    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub enum ClassVariant {
    Class(LoadedClass),
    Array(ArrayClass),
}
impl ClassVariant {
    #[must_use]
    pub fn id(&self) -> ClassId {
        match self {
            ClassVariant::Class(x) => x.id,
            ClassVariant::Array(x) => x.id,
        }
    }

    #[must_use]
    pub fn status(&self) -> ClassStatus {
        match self {
            ClassVariant::Class(x) => x.status,
            ClassVariant::Array(x) => x.status,
        }
    }

    pub(crate) fn set_status(&mut self, status: ClassStatus) {
        match self {
            ClassVariant::Class(x) => x.status = status,
            ClassVariant::Array(x) => x.status = status,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ClassVariant::Class(x) => &x.name,
            ClassVariant::Array(x) => &x.name,
        }
    }

    #[must_use]
    pub fn base_name(&self) -> &str {
        util::base_name(self.name())
    }

    #[must_use]
    /// Arrays are their own signature
    pub fn signature(&self) -> &str {
        match self {
            ClassVariant::Class(x) => &x.signature,
            ClassVariant::Array(x) => &x.name,
        }
    }

    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            ClassVariant::Class(x) => x.type_tag,
            ClassVariant::Array(_) => TypeTag::Array,
        }
    }

    #[must_use]
    /// `None` for arrays, which are not loaded from anywhere
    pub fn source_path(&self) -> Option<&str> {
        match self {
            ClassVariant::Class(x) => Some(&x.source_path),
            ClassVariant::Array(_) => None,
        }
    }

    #[must_use]
    pub fn as_class(&self) -> Option<&LoadedClass> {
        match self {
            ClassVariant::Class(x) => Some(x),
            ClassVariant::Array(_) => None,
        }
    }
}
