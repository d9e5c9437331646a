// ── Rule file source ──
//
// Lazily yields rows of a CSV rule file. The header row is discarded
// unread and short rows are passed through so the parser can reject
// them; only I/O failures surface as errors.
//
// The csv reader silently drops blank lines. They are still rows of the
// file, so a line tracker under the reader finds them and they come out
// as empty records, keeping every row number equal to its file line.

use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use tracing::debug;

use crate::error::CoreError;
use crate::model::RuleRecord;

/// Iterator over the data rows of a rule file.
pub struct RuleSource<R> {
    reader: csv::Reader<LineTracker<R>>,
    path: PathBuf,
    record: ByteRecord,
    pending: VecDeque<RuleRecord>,
    /// First line not yet accounted for by an emitted row or the header.
    next_line: u64,
    started: bool,
    done: bool,
}

impl RuleSource<File> {
    /// Open a rule file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CoreError::RuleFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "opened rule file");
        Ok(Self::from_reader(file, path))
    }
}

impl<R: io::Read> RuleSource<R> {
    /// Read rows from any reader. `path` is only used in error messages.
    pub fn from_reader(reader: R, path: impl Into<PathBuf>) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(LineTracker::new(reader));
        Self {
            reader,
            path: path.into(),
            record: ByteRecord::new(),
            pending: VecDeque::new(),
            next_line: 2,
            started: false,
            done: false,
        }
    }

    /// Queue a blank row for every blank line in `[self.next_line, before)`.
    fn queue_blank_lines(&mut self, before: Option<u64>) {
        let tracker = self.reader.get_ref();
        let blanks = tracker
            .blank_lines
            .iter()
            .copied()
            .filter(|&line| line >= self.next_line && before.is_none_or(|b| line < b));
        self.pending
            .extend(blanks.map(|line| RuleRecord::new(line, Vec::new())));
    }

    /// Blank lines above the header are not rows; start counting below it.
    fn skip_header_lines(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let start = match self.reader.byte_headers() {
            Ok(header) => header.position().map_or(0, csv::Position::byte),
            Err(_) => return,
        };
        self.next_line = self.reader.get_ref().first_content_line(start) + 1;
    }

    fn read_next(&mut self) -> Option<Result<(), CoreError>> {
        let read = self.reader.read_byte_record(&mut self.record);
        if read.is_ok() {
            self.skip_header_lines();
        }
        match read {
            Ok(true) => {
                let start = self.record.position().map_or(0, csv::Position::byte);
                let tracker = self.reader.get_ref();
                let line = tracker
                    .first_content_line(start)
                    .max(tracker.first_content_line_from(self.next_line));

                self.queue_blank_lines(Some(line));
                let fields = self
                    .record
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).into_owned())
                    .collect();
                self.pending.push_back(RuleRecord::new(line, fields));

                let end = self.reader.get_ref().line_at(self.reader.position().byte());
                self.next_line = end.max(line + 1);
                Some(Ok(()))
            }
            Ok(false) => {
                self.done = true;
                self.queue_blank_lines(None);
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(CoreError::RuleFile {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }))
            }
        }
    }
}

impl<R: io::Read> Iterator for RuleSource<R> {
    type Item = Result<RuleRecord, CoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }
            if let Some(Err(e)) = self.read_next() {
                return Some(Err(e));
            }
        }
    }
}

/// Pass-through reader that notes where each line starts and which lines
/// are blank (nothing but an optional `\r` before the `\n`).
struct LineTracker<R> {
    inner: R,
    offset: u64,
    line: u64,
    line_has_content: bool,
    /// Byte offset of the start of line `n` at index `n - 1`.
    line_starts: Vec<u64>,
    /// Blank line numbers, ascending.
    blank_lines: Vec<u64>,
}

impl<R> LineTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            line: 1,
            line_has_content: false,
            line_starts: vec![0],
            blank_lines: Vec::new(),
        }
    }

    /// 1-based line holding byte `offset`.
    fn line_at(&self, offset: u64) -> u64 {
        let idx = self.line_starts.partition_point(|&start| start <= offset);
        u64::try_from(idx).unwrap_or(u64::MAX).max(1)
    }

    fn is_blank(&self, line: u64) -> bool {
        self.blank_lines.binary_search(&line).is_ok()
    }

    /// First non-blank line at or after `line`.
    fn first_content_line_from(&self, mut line: u64) -> u64 {
        while self.is_blank(line) {
            line += 1;
        }
        line
    }

    /// First non-blank line at or after the line holding byte `offset`.
    fn first_content_line(&self, offset: u64) -> u64 {
        self.first_content_line_from(self.line_at(offset))
    }
}

impl<R: io::Read> io::Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in buf.iter().take(n) {
            self.offset += 1;
            match byte {
                b'\n' => {
                    if !self.line_has_content {
                        self.blank_lines.push(self.line);
                    }
                    self.line += 1;
                    self.line_has_content = false;
                    self.line_starts.push(self.offset);
                }
                b'\r' => {}
                _ => self.line_has_content = true,
            }
        }
        Ok(n)
    }
}
