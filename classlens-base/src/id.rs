/// The id of a class, as assigned by the vm that is being debugged.
/// We don't give these out ourselves, they are only used as keys.
// The derived `Hash` is a single `write_u32`, which is what nohash needs
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(u32);
impl ClassId {
    #[must_use]
    pub fn new(id: u32) -> ClassId {
        ClassId(id)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}
#[cfg(feature = "implementation-cheaper-map-hashing")]
impl nohash_hasher::IsEnabled for ClassId {}

/// The lifecycle status of a class as reported by the vm.
/// The bits are only meaningful to the vm, we just hold onto them.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassStatus(pub u32);

/// The position of a method in its class's method table
pub type MethodIndex = u16;

/// A method of a specific class, packed as the class id in the upper bits and the method index in
/// the lower 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(u64);
impl MethodId {
    /// Note: this does not check that the class has a method at that index
    #[must_use]
    pub fn unchecked_compose(class_id: ClassId, method_index: MethodIndex) -> Self {
        MethodId((u64::from(class_id.get()) << 16) | u64::from(method_index))
    }

    #[must_use]
    pub fn decompose(self) -> (ClassId, MethodIndex) {
        // Truncation is intended, the parts were packed from a u32 and a u16
        #[allow(clippy::cast_possible_truncation)]
        let class_id = ClassId::new((self.0 >> 16) as u32);
        #[allow(clippy::cast_possible_truncation)]
        let method_index = (self.0 & 0xFFFF) as MethodIndex;
        (class_id, method_index)
    }

    /// The packed form, for passing to the vm
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// `None` if the class id part does not fit in a u32
    #[must_use]
    pub fn from_u64(value: u64) -> Option<MethodId> {
        (value >> 48 == 0).then(|| MethodId(value))
    }
}

/// Whether the name is of an array class, like `[I` or `[Ljava/lang/String;`
pub(crate) fn is_array_class(name: &str) -> bool {
    name.starts_with('[')
}
