// nc_loader/src/source.rs
// Delimited text source: header and data rows decoded per the configured text properties.

use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Reader, ReaderBuilder, Terminator};
use encoding_rs::Encoding;

use crate::config::ReaderSettings;
use crate::error::{LoaderError, Result};

const BOM: char = '\u{feff}';

/// An open source file. The file handle is released when this value is dropped.
///
/// The csv reader silently skips blank lines. Every byte it consumes is kept until the
/// record that consumed it has been returned, so those lines still surface as records
/// with no fields and row numbers stay physical.
pub struct DelimitedSource {
    path:        PathBuf,
    reader:      Reader<Tap<File,>,>,
    encoding:    &'static Encoding,
    record:      ByteRecord,
    rows:        u64,
    consumed:    u64,
    lines:       LineTracker,
    blank_lines: u64,
    held:        bool,
}

impl DelimitedSource {
    pub fn open(path: &Path, settings: &ReaderSettings,) -> Result<Self,> {
        let file = File::open(path,).map_err(|source| LoaderError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        },)?;
        let reader = ReaderBuilder::new()
            .has_headers(false,)
            .flexible(true,)
            .delimiter(settings.delimiter,)
            .terminator(settings.terminator,)
            .from_reader(Tap::new(file,),);

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            encoding: settings.encoding,
            record: ByteRecord::new(),
            rows: 0,
            consumed: 0,
            lines: LineTracker::new(settings.terminator,),
            blank_lines: 0,
            held: false,
        },)
    }

    /// Number of data rows read so far.
    pub fn rows_read(&self,) -> u64 {
        self.rows
    }

    /// Reads the first record as the header. Must be called before [`Self::next_row`].
    pub fn read_header(&mut self,) -> Result<Vec<String,>,> {
        let found = self.read_record(0,)?;
        if self.blank_lines > 0 {
            return Err(self.malformed("first record is empty",),);
        }
        if !found {
            return Err(self.malformed("file has no header record",),);
        }

        let mut header = self.decode_record(0,)?;
        if let Some(first,) = header.first_mut()
            && first.starts_with(BOM,)
        {
            first.remove(0,);
        }

        if header.iter().all(|name| name.trim().is_empty(),) {
            return Err(self.malformed("first record is empty",),);
        }
        let mut seen = HashSet::with_capacity(header.len(),);
        for name in &header {
            if !seen.insert(name.as_str(),) {
                return Err(self.malformed(&format!("duplicate column name '{}'", name),),);
            }
        }
        Ok(header,)
    }

    /// Reads the next data row, or `None` at end of file. A blank line is a row with
    /// no fields.
    pub fn next_row(&mut self,) -> Result<Option<Vec<String,>,>,> {
        let row_number = self.rows + 1;
        if self.blank_lines == 0 && !self.held {
            self.held = self.read_record(row_number,)?;
        }
        if self.blank_lines > 0 {
            self.blank_lines -= 1;
            self.rows = row_number;
            return Ok(Some(Vec::new(),),);
        }
        if !self.held {
            return Ok(None,);
        }
        self.held = false;
        self.rows = row_number;
        self.decode_record(row_number,).map(Some,)
    }

    /// Reads one record into the buffer and counts the blank lines skipped before it.
    fn read_record(&mut self, row_number: u64,) -> Result<bool,> {
        let found = self
            .reader
            .read_byte_record(&mut self.record,)
            .map_err(|e| self.read_error(row_number, e.to_string(),),)?;

        let end = self.reader.position().byte();
        let span = (end - self.consumed) as usize;
        self.consumed = end;
        let unread = &mut self.reader.get_mut().unread;
        let span = span.min(unread.len(),);
        self.blank_lines = self.lines.blank_lines(unread.drain(..span,),);
        Ok(found,)
    }

    fn decode_record(&self, row_number: u64,) -> Result<Vec<String,>,> {
        self.record
            .iter()
            .enumerate()
            .map(|(column, bytes,)| {
                self.encoding
                    .decode_without_bom_handling_and_without_replacement(bytes,)
                    .map(|text| text.into_owned(),)
                    .ok_or_else(|| {
                        self.read_error(
                            row_number,
                            format!(
                                "column {} is not valid {}",
                                column + 1,
                                self.encoding.name()
                            ),
                        )
                    },)
            },)
            .collect()
    }

    fn read_error(&self, row: u64, message: String,) -> LoaderError {
        LoaderError::SourceRead {
            path: self.path.clone(),
            row,
            message,
        }
    }

    fn malformed(&self, reason: &str,) -> LoaderError {
        LoaderError::MalformedHeader {
            path:   self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Keeps a copy of every byte read from `inner` until the source drains it.
struct Tap<R,> {
    inner:  R,
    unread: VecDeque<u8,>,
}

impl<R,> Tap<R,> {
    fn new(inner: R,) -> Self {
        Self {
            inner,
            unread: VecDeque::new(),
        }
    }
}

impl<R: Read,> Read for Tap<R,> {
    fn read(&mut self, buf: &mut [u8],) -> io::Result<usize,> {
        let n = self.inner.read(buf,)?;
        self.unread.extend(&buf[..n],);
        Ok(n,)
    }
}

/// What is still missing from the line end of the last record returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
enum Owed {
    Nothing,
    LineEnd,
    LineFeed,
}

/// Follows line ends across the byte spans the csv reader consumes per record.
#[derive(Debug, Clone, Copy,)]
struct LineTracker {
    terminator: Terminator,
    owed:       Owed,
}

impl LineTracker {
    fn new(terminator: Terminator,) -> Self {
        Self {
            terminator,
            owed: Owed::Nothing,
        }
    }

    /// Counts the empty lines at the start of `span`. A line end still owed by the
    /// previous record is not one of them.
    fn blank_lines<I: IntoIterator<Item = u8,>,>(&mut self, span: I,) -> u64 {
        let mut blank = 0;
        let mut leading = true;
        for byte in span {
            if leading && self.ends_line(byte,) {
                if byte == b'\n' && self.owed == Owed::LineFeed {
                    self.owed = Owed::Nothing;
                    continue;
                }
                if self.owed != Owed::LineEnd {
                    blank += 1;
                }
            } else {
                leading = false;
            }
            self.owed = self.owed_after(byte,);
        }
        blank
    }

    fn ends_line(&self, byte: u8,) -> bool {
        match self.terminator {
            Terminator::Any(terminator,) => byte == terminator,
            _ => byte == b'\r' || byte == b'\n',
        }
    }

    fn owed_after(&self, byte: u8,) -> Owed {
        match self.terminator {
            Terminator::Any(terminator,) if byte == terminator => Owed::Nothing,
            Terminator::Any(_,) => Owed::LineEnd,
            _ => match byte {
                b'\r' => Owed::LineFeed,
                b'\n' => Owed::Nothing,
                _ => Owed::LineEnd,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(terminator: Terminator, spans: &[&[u8]],) -> Vec<u64,> {
        let mut lines = LineTracker::new(terminator,);
        spans
            .iter()
            .map(|span| lines.blank_lines(span.iter().copied(),),)
            .collect()
    }

    #[test]
    fn blank_lines_are_counted_whether_or_not_the_terminator_was_consumed() {
        let lf = Terminator::Any(b'\n',);
        assert_eq!(count(lf, &[b"id,name\n", b"1,a\n", b"\n3,c\n"]), vec![0, 0, 1]);
        assert_eq!(count(lf, &[b"id,name", b"\n1,a", b"\n\n3,c"]), vec![0, 0, 1]);
        assert_eq!(count(lf, &[b"\n\nid"]), vec![2]);
    }

    #[test]
    fn crlf_pairs_count_once() {
        let crlf = Terminator::CRLF;
        assert_eq!(count(crlf, &[b"id\r", b"\n1\r\n", b"\r\n\n2"]), vec![0, 0, 2]);
        assert_eq!(count(crlf, &[b"id\r\n", b"\r\r\n3"]), vec![0, 2]);
        assert_eq!(count(crlf, &[b"id\r", b"\r\n3"]), vec![0, 1]);
    }

    #[test]
    fn quoted_line_ends_are_not_blank_lines() {
        let lf = Terminator::Any(b'\n',);
        assert_eq!(count(lf, &[b"id\n", b"\"a\n\nb\"\n", b"2\n"]), vec![0, 0, 0]);
    }
}
