use std::{error::Error, fmt};

use crate::{class::ClassFile, ClassFileParseError};

#[derive(Debug)]
#[non_exhaustive]
pub enum LoadClassFileError {
    /// The name given was empty
    EmptyName,
    /// The class wasn't found under any of the roots
    Nonexistent(String),
    /// There was an error in reading the file
    ReadError(std::io::Error),
    /// There was an error in parsing the class file
    ClassFileParse(ClassFileParseError),
    OpaqueError(Box<dyn Error + Send + Sync>),
}
impl From<ClassFileParseError> for LoadClassFileError {
    fn from(err: ClassFileParseError) -> Self {
        Self::ClassFileParse(err)
    }
}
impl fmt::Display for LoadClassFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "empty class name"),
            Self::Nonexistent(name) => write!(f, "class {} was not found", name),
            Self::ReadError(err) => write!(f, "failed to read class file: {}", err),
            Self::ClassFileParse(err) => write!(f, "failed to decode class file: {}", err),
            Self::OpaqueError(err) => write!(f, "{}", err),
        }
    }
}
impl Error for LoadClassFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadError(err) => Some(err),
            Self::ClassFileParse(err) => Some(err),
            Self::OpaqueError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// A decoded class file along with where it came from
#[derive(Debug, Clone)]
pub struct ClassFileData {
    /// A human readable description of where the bytes were read from, like the path to the file
    pub source: String,
    pub class_file: ClassFile,
}

/// Note: Not exactly a class loader in the java sense, but does somewhat similar things
pub trait ClassFileLoader {
    /// Find and decode the class file for the class with the given name.
    /// The name may be in either the dotted or slashed form.
    /// Return `LoadClassFileError::Nonexistent` if it was not found.
    fn load_class_file(&self, class_name: &str) -> Result<ClassFileData, LoadClassFileError>;
}
impl<'a, T: ClassFileLoader> ClassFileLoader for &'a T {
    fn load_class_file(&self, class_name: &str) -> Result<ClassFileData, LoadClassFileError> {
        <T as ClassFileLoader>::load_class_file(self, class_name)
    }
}
