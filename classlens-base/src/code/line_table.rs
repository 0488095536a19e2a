use std::io::Read;

use crate::{reader::ClassReader, ClassFileParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberEntry {
    /// The bytecode offset at which this line starts
    pub start_pc: u16,
    pub line_number: u16,
}

/// Where a debugger should place its temporary breakpoints to step over the current line.
/// Any of these can be missing, such as when the current line is the last one in the method.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SteppingInfo {
    /// Start of the next line that will be executed
    pub target: Option<u16>,
    /// Start of the other entry for that same line, as happens with loop conditions
    pub duplicate: Option<u16>,
    /// Start of the entry right after that duplicate
    pub after_duplicate: Option<u16>,
}

/// The line number table of a method's code.
///
/// The entries are kept in the order they were in the file. They are not necessarily sorted by
/// offset, and a single source line may have several entries: compilers commonly put a loop's
/// condition both before the body and after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineNumberTable {
    entries: Vec<LineNumberEntry>,
}
impl LineNumberTable {
    #[must_use]
    pub fn new(entries: Vec<LineNumberEntry>) -> LineNumberTable {
        LineNumberTable { entries }
    }

    pub(crate) fn parse<R: Read>(
        reader: &mut ClassReader<R>,
    ) -> Result<LineNumberTable, ClassFileParseError> {
        let count = reader.read_u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            entries.push(LineNumberEntry {
                start_pc: reader.read_u16()?,
                line_number: reader.read_u16()?,
            });
        }
        Ok(LineNumberTable { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[LineNumberEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&LineNumberEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn start_offset(&self, index: usize) -> Option<u16> {
        self.entry(index).map(|x| x.start_pc)
    }

    #[must_use]
    pub fn line_number(&self, index: usize) -> Option<u16> {
        self.entry(index).map(|x| x.line_number)
    }

    #[must_use]
    pub fn contains_line(&self, line: u16) -> bool {
        self.entries.iter().any(|x| x.line_number == line)
    }

    #[must_use]
    /// The offset of the first entry for the line
    pub fn offset_for_line(&self, line: u16) -> Option<u16> {
        self.entries
            .iter()
            .find(|x| x.line_number == line)
            .map(|x| x.start_pc)
    }

    /// Find the index of the entry whose range holds `offset`.
    /// An entry's range runs up to the start of the entry after it in the table, and the last
    /// entry runs through the end of the code.
    #[must_use]
    pub fn entry_containing_offset(&self, offset: u32) -> Option<usize> {
        let last = self.entries.len().checked_sub(1)?;
        for (i, pair) in self.entries.windows(2).enumerate() {
            let start = u32::from(pair[0].start_pc);
            let next = u32::from(pair[1].start_pc);
            if start <= offset && offset < next {
                return Some(i);
            }
        }

        if u32::from(self.entries[last].start_pc) <= offset {
            Some(last)
        } else {
            None
        }
    }

    /// The line number of the entry containing the offset
    #[must_use]
    pub fn current_line(&self, offset: u32) -> Option<u16> {
        self.entry_containing_offset(offset)
            .and_then(|i| self.line_number(i))
    }

    /// Find another entry with the same line number as the entry at `index`.
    /// If there are several, the first one in the table is used.
    #[must_use]
    pub fn duplicate_of(&self, index: usize) -> Option<usize> {
        let line = self.line_number(index)?;
        self.entries
            .iter()
            .enumerate()
            .find(|(i, x)| *i != index && x.line_number == line)
            .map(|(i, _)| i)
    }

    /// The index of the entry that executes after the line containing `offset`.
    ///
    /// When the current line has a duplicate earlier in the table we are at the bottom of a loop,
    /// and so the next line is the one after that earlier entry, which is the start of the body.
    #[must_use]
    pub fn next_executable_line(&self, offset: u32) -> Option<usize> {
        let current = self.entry_containing_offset(offset)?;
        let next = match self.duplicate_of(current) {
            Some(dup) if dup < current => dup + 1,
            _ => current + 1,
        };

        if next < self.entries.len() {
            Some(next)
        } else {
            None
        }
    }

    /// The duplicate of the next executable line, if it has one
    #[must_use]
    pub fn duplicate_current_line(&self, offset: u32) -> Option<usize> {
        self.next_executable_line(offset)
            .and_then(|next| self.duplicate_of(next))
    }

    #[must_use]
    pub fn offset_after(&self, index: usize) -> Option<u16> {
        self.start_offset(index.checked_add(1)?)
    }

    /// Every `(line, offset)` pair, in table order
    pub fn breakable_lines(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.entries.iter().map(|x| (x.line_number, x.start_pc))
    }

    #[must_use]
    pub fn stepping_info(&self, offset: u32) -> SteppingInfo {
        let next = self.next_executable_line(offset);
        let duplicate = self.duplicate_current_line(offset);
        SteppingInfo {
            target: next.and_then(|i| self.start_offset(i)),
            duplicate: duplicate.and_then(|i| self.start_offset(i)),
            after_duplicate: duplicate.and_then(|i| self.offset_after(i)),
        }
    }
}
