use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::ClassFileParseError;

/// A big-endian reader over the class file's byte stream which keeps track of how far it has
/// read, so that attributes can be checked against the length they declared.
#[derive(Debug)]
pub struct ClassReader<R> {
    inner: R,
    position: u64,
}
impl<R: Read> ClassReader<R> {
    pub fn new(inner: R) -> ClassReader<R> {
        ClassReader { inner, position: 0 }
    }

    /// The number of bytes that have been consumed so far
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn read_u8(&mut self) -> Result<u8, ClassFileParseError> {
        let v = self.inner.read_u8()?;
        self.position += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16, ClassFileParseError> {
        let v = self.inner.read_u16::<BigEndian>()?;
        self.position += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32, ClassFileParseError> {
        let v = self.inner.read_u32::<BigEndian>()?;
        self.position += 4;
        Ok(v)
    }

    pub fn read_i32(&mut self) -> Result<i32, ClassFileParseError> {
        let v = self.inner.read_i32::<BigEndian>()?;
        self.position += 4;
        Ok(v)
    }

    pub fn read_i64(&mut self) -> Result<i64, ClassFileParseError> {
        let v = self.inner.read_i64::<BigEndian>()?;
        self.position += 8;
        Ok(v)
    }

    pub fn read_f32(&mut self) -> Result<f32, ClassFileParseError> {
        let v = self.inner.read_f32::<BigEndian>()?;
        self.position += 4;
        Ok(v)
    }

    pub fn read_f64(&mut self) -> Result<f64, ClassFileParseError> {
        let v = self.inner.read_f64::<BigEndian>()?;
        self.position += 8;
        Ok(v)
    }

    /// Read exactly `len` bytes.
    /// This does not trust `len` for the allocation, since it comes from the file, and so a
    /// bogus length only costs as much as the data that is actually there.
    pub fn read_bytes(&mut self, len: u32) -> Result<Vec<u8>, ClassFileParseError> {
        let mut data = Vec::new();
        (&mut self.inner)
            .take(u64::from(len))
            .read_to_end(&mut data)?;
        self.position += data.len() as u64;

        if data.len() as u64 == u64::from(len) {
            Ok(data)
        } else {
            Err(ClassFileParseError::UnexpectedEof)
        }
    }

    /// Read `count` big-endian u16s, which is the shape of most of the tables in a class file
    pub fn read_u16_table<T>(
        &mut self,
        count: u16,
        mut f: impl FnMut(u16) -> T,
    ) -> Result<Vec<T>, ClassFileParseError> {
        let mut res = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            res.push(f(self.read_u16()?));
        }
        Ok(res)
    }

    /// Check whether there is any data left, consuming at most one byte
    pub fn is_at_end(&mut self) -> Result<bool, ClassFileParseError> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.position += 1;
                    return Ok(false);
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClassReader;
    use crate::ClassFileParseError;

    #[test]
    fn test_big_endian_reads() {
        let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x03, 0x7F];
        let mut reader = ClassReader::new(&data[..]);
        assert_eq!(reader.read_u32().unwrap(), 0xCAFE_BABE);
        assert_eq!(reader.read_u16().unwrap(), 3);
        assert_eq!(reader.position(), 6);
        assert_eq!(reader.read_u8().unwrap(), 0x7F);
        assert!(reader.is_at_end().unwrap());
    }

    #[test]
    fn test_short_reads() {
        let data = [0x00];
        let mut reader = ClassReader::new(&data[..]);
        assert!(matches!(
            reader.read_u16(),
            Err(ClassFileParseError::UnexpectedEof)
        ));

        let data = [1, 2, 3];
        let mut reader = ClassReader::new(&data[..]);
        assert!(matches!(
            reader.read_bytes(8),
            Err(ClassFileParseError::UnexpectedEof)
        ));
        assert_eq!(reader.position(), 3);
    }
}
