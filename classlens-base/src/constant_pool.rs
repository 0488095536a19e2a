use std::{
    fmt,
    hash::{Hash, Hasher},
    io::Read,
    marker::PhantomData,
    num::NonZeroU16,
};

use crate::{reader::ClassReader, ClassFileParseError};

/// An index into the constant pool as it was read from the file.
/// This may be zero, which is used by some fields (like the super class) to mean 'nothing'.
/// The type parameter is the kind of constant that the index is expected to refer to, but
/// that is not checked until it is used.
pub struct ConstantPoolIndexRaw<T>(u16, PhantomData<fn() -> T>);
impl<T> ConstantPoolIndexRaw<T> {
    #[must_use]
    pub fn new(i: u16) -> Self {
        Self(i, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn into_generic(self) -> ConstantPoolIndexRaw<ConstantInfo> {
        ConstantPoolIndexRaw::new(self.0)
    }
}
impl<T> Clone for ConstantPoolIndexRaw<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for ConstantPoolIndexRaw<T> {}
impl<T> PartialEq for ConstantPoolIndexRaw<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for ConstantPoolIndexRaw<T> {}
impl<T> Hash for ConstantPoolIndexRaw<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
impl<T> fmt::Debug for ConstantPoolIndexRaw<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An index into the constant pool which is known to not be zero.
pub struct ConstantPoolIndex<T>(NonZeroU16, PhantomData<fn() -> T>);
impl<T> ConstantPoolIndex<T> {
    #[must_use]
    pub fn new(i: u16) -> Option<Self> {
        NonZeroU16::new(i).map(|i| Self(i, PhantomData))
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0.get()
    }

    #[must_use]
    pub fn into_raw(self) -> ConstantPoolIndexRaw<T> {
        ConstantPoolIndexRaw::new(self.0.get())
    }
}
impl<T> Clone for ConstantPoolIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for ConstantPoolIndex<T> {}
impl<T> PartialEq for ConstantPoolIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for ConstantPoolIndex<T> {}
impl<T> fmt::Debug for ConstantPoolIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The index was zero, which never refers to a constant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroIndexError;

impl<T> TryFrom<ConstantPoolIndexRaw<T>> for ConstantPoolIndex<T> {
    type Error = ZeroIndexError;

    fn try_from(value: ConstantPoolIndexRaw<T>) -> Result<Self, Self::Error> {
        ConstantPoolIndex::new(value.0).ok_or(ZeroIndexError)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utf8Constant {
    pub value: String,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerConstant {
    pub value: i32,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatConstant {
    pub value: f32,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongConstant {
    pub value: i64,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleConstant {
    pub value: f64,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassConstant {
    pub name_index: ConstantPoolIndexRaw<Utf8Constant>,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringConstant {
    pub string_index: ConstantPoolIndexRaw<Utf8Constant>,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRefConstant {
    pub class_index: ConstantPoolIndexRaw<ClassConstant>,
    pub name_and_type_index: ConstantPoolIndexRaw<NameAndTypeConstant>,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodRefConstant {
    pub class_index: ConstantPoolIndexRaw<ClassConstant>,
    pub name_and_type_index: ConstantPoolIndexRaw<NameAndTypeConstant>,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceMethodRefConstant {
    pub class_index: ConstantPoolIndexRaw<ClassConstant>,
    pub name_and_type_index: ConstantPoolIndexRaw<NameAndTypeConstant>,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameAndTypeConstant {
    pub name_index: ConstantPoolIndexRaw<Utf8Constant>,
    pub descriptor_index: ConstantPoolIndexRaw<Utf8Constant>,
}

pub const TAG_UTF8: u8 = 1;
pub const TAG_INTEGER: u8 = 3;
pub const TAG_FLOAT: u8 = 4;
pub const TAG_LONG: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_CLASS: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_FIELD_REF: u8 = 9;
pub const TAG_METHOD_REF: u8 = 10;
pub const TAG_INTERFACE_METHOD_REF: u8 = 11;
pub const TAG_NAME_AND_TYPE: u8 = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantInfo {
    Utf8(Utf8Constant),
    Integer(IntegerConstant),
    Float(FloatConstant),
    Long(LongConstant),
    Double(DoubleConstant),
    Class(ClassConstant),
    String(StringConstant),
    FieldRef(FieldRefConstant),
    MethodRef(MethodRefConstant),
    InterfaceMethodRef(InterfaceMethodRefConstant),
    NameAndType(NameAndTypeConstant),
}
impl ConstantInfo {
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            ConstantInfo::Utf8(_) => TAG_UTF8,
            ConstantInfo::Integer(_) => TAG_INTEGER,
            ConstantInfo::Float(_) => TAG_FLOAT,
            ConstantInfo::Long(_) => TAG_LONG,
            ConstantInfo::Double(_) => TAG_DOUBLE,
            ConstantInfo::Class(_) => TAG_CLASS,
            ConstantInfo::String(_) => TAG_STRING,
            ConstantInfo::FieldRef(_) => TAG_FIELD_REF,
            ConstantInfo::MethodRef(_) => TAG_METHOD_REF,
            ConstantInfo::InterfaceMethodRef(_) => TAG_INTERFACE_METHOD_REF,
            ConstantInfo::NameAndType(_) => TAG_NAME_AND_TYPE,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstantInfo::Utf8(_) => "Utf8",
            ConstantInfo::Integer(_) => "Integer",
            ConstantInfo::Float(_) => "Float",
            ConstantInfo::Long(_) => "Long",
            ConstantInfo::Double(_) => "Double",
            ConstantInfo::Class(_) => "Class",
            ConstantInfo::String(_) => "String",
            ConstantInfo::FieldRef(_) => "Fieldref",
            ConstantInfo::MethodRef(_) => "Methodref",
            ConstantInfo::InterfaceMethodRef(_) => "InterfaceMethodref",
            ConstantInfo::NameAndType(_) => "NameAndType",
        }
    }

    /// Whether this entry takes up two slots in the pool
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, ConstantInfo::Long(_) | ConstantInfo::Double(_))
    }

    fn parse<R: Read>(
        reader: &mut ClassReader<R>,
        index: u16,
        tag: u8,
    ) -> Result<ConstantInfo, ClassFileParseError> {
        let info = match tag {
            TAG_UTF8 => {
                let length = reader.read_u16()?;
                let data = reader.read_bytes(u32::from(length))?;
                let value = cesu8::from_java_cesu8(&data)
                    .map_err(|_| ClassFileParseError::InvalidUtf8 { index })?
                    .into_owned();
                ConstantInfo::Utf8(Utf8Constant { value })
            }
            TAG_INTEGER => ConstantInfo::Integer(IntegerConstant {
                value: reader.read_i32()?,
            }),
            TAG_FLOAT => ConstantInfo::Float(FloatConstant {
                value: reader.read_f32()?,
            }),
            TAG_LONG => ConstantInfo::Long(LongConstant {
                value: reader.read_i64()?,
            }),
            TAG_DOUBLE => ConstantInfo::Double(DoubleConstant {
                value: reader.read_f64()?,
            }),
            TAG_CLASS => ConstantInfo::Class(ClassConstant {
                name_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            }),
            TAG_STRING => ConstantInfo::String(StringConstant {
                string_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            }),
            TAG_FIELD_REF => ConstantInfo::FieldRef(FieldRefConstant {
                class_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                name_and_type_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            }),
            TAG_METHOD_REF => ConstantInfo::MethodRef(MethodRefConstant {
                class_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                name_and_type_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            }),
            TAG_INTERFACE_METHOD_REF => ConstantInfo::InterfaceMethodRef(InterfaceMethodRefConstant {
                class_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                name_and_type_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            }),
            TAG_NAME_AND_TYPE => ConstantInfo::NameAndType(NameAndTypeConstant {
                name_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
                descriptor_index: ConstantPoolIndexRaw::new(reader.read_u16()?),
            }),
            _ => return Err(ClassFileParseError::UnknownConstantTag { index, tag }),
        };
        Ok(info)
    }
}
impl fmt::Display for ConstantInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantInfo::Utf8(x) => write!(f, "Utf8 \"{}\"", x.value),
            ConstantInfo::Integer(x) => write!(f, "Integer {}", x.value),
            ConstantInfo::Float(x) => write!(f, "Float {}", x.value),
            ConstantInfo::Long(x) => write!(f, "Long {}", x.value),
            ConstantInfo::Double(x) => write!(f, "Double {}", x.value),
            ConstantInfo::Class(x) => write!(f, "Class {:?}", x.name_index),
            ConstantInfo::String(x) => write!(f, "String {:?}", x.string_index),
            ConstantInfo::FieldRef(x) => {
                write!(f, "Fieldref {:?}.{:?}", x.class_index, x.name_and_type_index)
            }
            ConstantInfo::MethodRef(x) => {
                write!(f, "Methodref {:?}.{:?}", x.class_index, x.name_and_type_index)
            }
            ConstantInfo::InterfaceMethodRef(x) => write!(
                f,
                "InterfaceMethodref {:?}.{:?}",
                x.class_index, x.name_and_type_index
            ),
            ConstantInfo::NameAndType(x) => {
                write!(f, "NameAndType {:?}:{:?}", x.name_index, x.descriptor_index)
            }
        }
    }
}

macro_rules! impl_constant_variant {
    ($($variant:ident => $name:ident),* $(,)*) => {
        $(
            impl<'a> TryFrom<&'a ConstantInfo> for &'a $name {
                type Error = ();

                fn try_from(value: &'a ConstantInfo) -> Result<Self, Self::Error> {
                    match value {
                        ConstantInfo::$variant(x) => Ok(x),
                        _ => Err(()),
                    }
                }
            }
            impl From<$name> for ConstantInfo {
                fn from(v: $name) -> ConstantInfo {
                    ConstantInfo::$variant(v)
                }
            }
        )*
    };
}
impl_constant_variant!(
    Utf8 => Utf8Constant,
    Integer => IntegerConstant,
    Float => FloatConstant,
    Long => LongConstant,
    Double => DoubleConstant,
    Class => ClassConstant,
    String => StringConstant,
    FieldRef => FieldRefConstant,
    MethodRef => MethodRefConstant,
    InterfaceMethodRef => InterfaceMethodRefConstant,
    NameAndType => NameAndTypeConstant,
);

/// The index did not refer to a constant of the expected kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidConstantPoolIndex(pub ConstantPoolIndexRaw<ConstantInfo>);

/// The constant pool of a class file.
/// Slot zero, and the slot after any long or double, hold nothing and can't be addressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    slots: Vec<Option<ConstantInfo>>,
}
impl ConstantPool {
    /// Construct a pool from entries in the order they would be in the file.
    /// Longs and doubles have their unusable slot inserted after them.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ConstantInfo>) -> ConstantPool {
        let mut slots = vec![None];
        for entry in entries {
            let is_wide = entry.is_wide();
            slots.push(Some(entry));
            if is_wide {
                slots.push(None);
            }
        }
        ConstantPool { slots }
    }

    pub(crate) fn parse<R: Read>(
        reader: &mut ClassReader<R>,
    ) -> Result<ConstantPool, ClassFileParseError> {
        let count = reader.read_u16()?;

        let mut slots = Vec::with_capacity(usize::from(count).max(1));
        // There is no entry at index 0
        slots.push(None);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.read_u8()?;
            let info = ConstantInfo::parse(reader, index, tag)?;
            let is_wide = info.is_wide();
            slots.push(Some(info));

            if is_wide {
                // Longs and doubles 'take' two entries, and the second one must still be
                // inside the pool
                if index + 1 >= count {
                    return Err(ClassFileParseError::WideConstantOverflow { index });
                }
                slots.push(None);
                index += 2;
            } else {
                index += 1;
            }
        }

        Ok(ConstantPool { slots })
    }

    /// The number of slots, including the unused zeroth slot.
    /// This is the `constant_pool_count` from the class file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    #[must_use]
    pub fn get<T>(&self, i: impl TryInto<ConstantPoolIndex<T>>) -> Option<&ConstantInfo> {
        let i: ConstantPoolIndex<T> = i.try_into().ok()?;
        self.slots.get(usize::from(i.get()))?.as_ref()
    }

    #[must_use]
    pub fn get_t<'a, T>(&'a self, i: impl TryInto<ConstantPoolIndex<T>>) -> Option<&'a T>
    where
        &'a T: TryFrom<&'a ConstantInfo>,
    {
        let i: ConstantPoolIndex<T> = i.try_into().ok()?;
        let v: &'a ConstantInfo = self.get(i)?;
        <&'a T>::try_from(v).ok()
    }

    pub fn getr<'a, T>(
        &'a self,
        i: ConstantPoolIndexRaw<T>,
    ) -> Result<&'a T, InvalidConstantPoolIndex>
    where
        &'a T: TryFrom<&'a ConstantInfo>,
    {
        self.get_t(i)
            .ok_or_else(|| InvalidConstantPoolIndex(i.into_generic()))
    }

    #[must_use]
    pub fn get_text_t(&self, i: impl TryInto<ConstantPoolIndex<Utf8Constant>>) -> Option<&str> {
        self.get_t(i).map(|x: &Utf8Constant| x.value.as_str())
    }

    /// Get the name of the class that the index refers to
    #[must_use]
    pub fn class_name(&self, i: ConstantPoolIndexRaw<ClassConstant>) -> Option<&str> {
        let class = self.get_t(i)?;
        self.get_text_t(class.name_index)
    }

    /// Iterate over the entries, skipping the zeroth slot and the slots after longs and doubles
    pub fn iter(&self) -> impl Iterator<Item = (ConstantPoolIndexRaw<ConstantInfo>, &ConstantInfo)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let i = u16::try_from(i).ok()?;
            slot.as_ref().map(|info| (ConstantPoolIndexRaw::new(i), info))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ClassConstant, ConstantInfo, ConstantPool, ConstantPoolIndexRaw, DoubleConstant,
        FieldRefConstant, FloatConstant, IntegerConstant, InterfaceMethodRefConstant,
        LongConstant, MethodRefConstant, NameAndTypeConstant, StringConstant, Utf8Constant,
    };
    use crate::{reader::ClassReader, ClassFileParseError};

    fn utf8(data: &mut Vec<u8>, text: &str) {
        data.push(1);
        data.extend_from_slice(&(text.len() as u16).to_be_bytes());
        data.extend_from_slice(text.as_bytes());
    }

    fn entry(data: &mut Vec<u8>, tag: u8, indices: &[u16]) {
        data.push(tag);
        for index in indices {
            data.extend_from_slice(&index.to_be_bytes());
        }
    }

    #[test]
    fn test_every_tag() {
        let mut data = Vec::new();
        data.extend_from_slice(&15u16.to_be_bytes());
        // #1
        utf8(&mut data, "pkg/A");
        // #2
        data.push(3);
        data.extend_from_slice(&(-7i32).to_be_bytes());
        // #3
        data.push(4);
        data.extend_from_slice(&2.5f32.to_be_bytes());
        // #4, #5
        data.push(5);
        data.extend_from_slice(&(1i64 << 40).to_be_bytes());
        // #6, #7
        data.push(6);
        data.extend_from_slice(&(-0.25f64).to_be_bytes());
        // #8
        entry(&mut data, 7, &[1]);
        // #9
        entry(&mut data, 8, &[14]);
        // #10
        entry(&mut data, 12, &[1, 14]);
        // #11
        entry(&mut data, 9, &[8, 10]);
        // #12
        entry(&mut data, 10, &[8, 10]);
        // #13
        entry(&mut data, 11, &[8, 10]);
        // #14
        utf8(&mut data, "I");

        let mut reader = ClassReader::new(data.as_slice());
        let pool = ConstantPool::parse(&mut reader).unwrap();
        assert_eq!(reader.position(), data.len() as u64);
        assert_eq!(pool.len(), 15);

        let raw = ConstantPoolIndexRaw::new;
        assert_eq!(pool.get_text_t(raw(1)), Some("pkg/A"));
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<IntegerConstant>::new(2)),
            Some(&IntegerConstant { value: -7 })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<FloatConstant>::new(3)),
            Some(&FloatConstant { value: 2.5 })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<LongConstant>::new(4)),
            Some(&LongConstant { value: 1 << 40 })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<DoubleConstant>::new(6)),
            Some(&DoubleConstant { value: -0.25 })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<ClassConstant>::new(8)),
            Some(&ClassConstant {
                name_index: raw(1)
            })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<StringConstant>::new(9)),
            Some(&StringConstant {
                string_index: raw(14)
            })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<NameAndTypeConstant>::new(10)),
            Some(&NameAndTypeConstant {
                name_index: raw(1),
                descriptor_index: raw(14),
            })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<FieldRefConstant>::new(11)),
            Some(&FieldRefConstant {
                class_index: ConstantPoolIndexRaw::new(8),
                name_and_type_index: ConstantPoolIndexRaw::new(10),
            })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<MethodRefConstant>::new(12)),
            Some(&MethodRefConstant {
                class_index: ConstantPoolIndexRaw::new(8),
                name_and_type_index: ConstantPoolIndexRaw::new(10),
            })
        );
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<InterfaceMethodRefConstant>::new(13)),
            Some(&InterfaceMethodRefConstant {
                class_index: ConstantPoolIndexRaw::new(8),
                name_and_type_index: ConstantPoolIndexRaw::new(10),
            })
        );
        assert_eq!(pool.class_name(ConstantPoolIndexRaw::new(8)), Some("pkg/A"));

        let kinds: Vec<&str> = pool.iter().map(|(_, info)| info.kind_name()).collect();
        assert_eq!(
            kinds,
            vec![
                "Utf8",
                "Integer",
                "Float",
                "Long",
                "Double",
                "Class",
                "String",
                "NameAndType",
                "Fieldref",
                "Methodref",
                "InterfaceMethodref",
                "Utf8",
            ]
        );
        // A field ref is not a method ref, even though they are laid out the same
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<MethodRefConstant>::new(11)),
            None
        );
    }

    #[test]
    fn test_wide_entries_take_two_slots() {
        let mut data = Vec::new();
        // count of 6: #1 long (+#2), #3 utf8, #4 double (+#5)
        data.extend_from_slice(&6u16.to_be_bytes());
        data.push(5);
        data.extend_from_slice(&(-2i64).to_be_bytes());
        utf8(&mut data, "after");
        data.push(6);
        data.extend_from_slice(&1.5f64.to_be_bytes());

        let mut reader = ClassReader::new(data.as_slice());
        let pool = ConstantPool::parse(&mut reader).unwrap();
        assert_eq!(pool.len(), 6);
        assert_eq!(
            pool.get_t(ConstantPoolIndexRaw::<LongConstant>::new(1)),
            Some(&LongConstant { value: -2 })
        );
        assert_eq!(pool.get(ConstantPoolIndexRaw::<ConstantInfo>::new(2)), None);
        assert_eq!(pool.get_text_t(ConstantPoolIndexRaw::new(3)), Some("after"));
        assert_eq!(pool.get(ConstantPoolIndexRaw::<ConstantInfo>::new(5)), None);

        let indices: Vec<u16> = pool.iter().map(|(i, _)| i.get()).collect();
        assert_eq!(indices, vec![1, 3, 4]);
    }

    #[test]
    fn test_unknown_tag() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u16.to_be_bytes());
        utf8(&mut data, "x");
        data.push(2);
        let mut reader = ClassReader::new(data.as_slice());
        assert!(matches!(
            ConstantPool::parse(&mut reader),
            Err(ClassFileParseError::UnknownConstantTag { index: 2, tag: 2 })
        ));
    }

    #[test]
    fn test_wide_entry_at_end() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_be_bytes());
        data.push(5);
        data.extend_from_slice(&0i64.to_be_bytes());
        let mut reader = ClassReader::new(data.as_slice());
        assert!(matches!(
            ConstantPool::parse(&mut reader),
            Err(ClassFileParseError::WideConstantOverflow { index: 1 })
        ));
    }

    #[test]
    fn test_modified_utf8() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_be_bytes());
        // "a\0b" with the null encoded as two bytes
        data.push(1);
        data.extend_from_slice(&4u16.to_be_bytes());
        data.extend_from_slice(&[b'a', 0xC0, 0x80, b'b']);
        let mut reader = ClassReader::new(data.as_slice());
        let pool = ConstantPool::parse(&mut reader).unwrap();
        assert_eq!(pool.get_text_t(ConstantPoolIndexRaw::new(1)), Some("a\0b"));
    }

    #[test]
    fn test_typed_lookup() {
        let pool = ConstantPool::from_entries([
            ConstantInfo::Utf8(Utf8Constant {
                value: "java/lang/Object".to_owned(),
            }),
            ConstantInfo::Class(ClassConstant {
                name_index: ConstantPoolIndexRaw::new(1),
            }),
        ]);

        assert_eq!(
            pool.class_name(ConstantPoolIndexRaw::new(2)),
            Some("java/lang/Object")
        );
        // Wrong kind
        assert_eq!(pool.class_name(ConstantPoolIndexRaw::new(1)), None);
        // Zero and out of range
        assert_eq!(pool.get_text_t(ConstantPoolIndexRaw::new(0)), None);
        assert_eq!(pool.get_text_t(ConstantPoolIndexRaw::new(9)), None);
        assert!(pool
            .getr(ConstantPoolIndexRaw::<ClassConstant>::new(1))
            .is_err());
    }
}
