use bitflags::bitflags;

/// What [`access_string`](MethodAccessFlags::access_string) gives back when no keyword flag is set
pub const NO_ACCESS_SPECIFIED: &str = "Not explicitly specified.";

bitflags! {
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    pub struct InnerClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

/// Implements `access_string` for a flag set, listing the keywords in the order they are given.
/// Flags without a source keyword (like `SYNTHETIC`) are left out.
macro_rules! impl_access_string {
    ($flags:ident { $($flag:ident => $keyword:literal),* $(,)* }) => {
        impl $flags {
            /// The source keywords of the set flags separated by spaces, like `public static`
            #[must_use]
            pub fn access_string(self) -> String {
                let keywords = [$(($flags::$flag, $keyword)),*];
                let text = keywords
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, keyword)| *keyword)
                    .collect::<Vec<_>>()
                    .join(" ");

                if text.is_empty() {
                    NO_ACCESS_SPECIFIED.to_owned()
                } else {
                    text
                }
            }
        }
    };
}

impl_access_string!(ClassAccessFlags {
    PUBLIC => "public",
    FINAL => "final",
    INTERFACE => "interface",
    ABSTRACT => "abstract",
});
impl_access_string!(FieldAccessFlags {
    PUBLIC => "public",
    PRIVATE => "private",
    PROTECTED => "protected",
    STATIC => "static",
    FINAL => "final",
    VOLATILE => "volatile",
    TRANSIENT => "transient",
});
impl_access_string!(MethodAccessFlags {
    PUBLIC => "public",
    PRIVATE => "private",
    PROTECTED => "protected",
    STATIC => "static",
    FINAL => "final",
    SYNCHRONIZED => "synchronized",
    NATIVE => "native",
    ABSTRACT => "abstract",
    STRICT => "strict",
});
impl_access_string!(InnerClassAccessFlags {
    PUBLIC => "public",
    PRIVATE => "private",
    PROTECTED => "protected",
    STATIC => "static",
    FINAL => "final",
    INTERFACE => "interface",
    ABSTRACT => "abstract",
});
