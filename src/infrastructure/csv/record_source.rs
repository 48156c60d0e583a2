// ============================================================
// CSV RECORD SOURCE
// ============================================================
// Stream raw records out of a CSV file one logical line at a time

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::disaster::RawRecord;
use crate::domain::error::{AppError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Largest logical record (in bytes) a quoted field may grow to
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

/// Line-oriented CSV reader.
///
/// `csv::Reader` silently drops empty lines, but blank rows have to be
/// counted, so lines are framed here and each logical line is handed to
/// the `csv` crate on its own. A quoted field may span several physical
/// lines; framing keeps reading until it is closed.
///
/// Framing problems (an unterminated or oversized quoted field, a line
/// the parser splits into several records) come back as
/// `AppError::ParseError`. The offending lines are consumed, so reading
/// can continue with the next record.
pub struct RecordSource<R> {
    reader: R,

    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Escape character inside quoted fields (default: backslash)
    escape: u8,

    max_record_bytes: usize,

    /// Physical lines consumed so far
    line_number: u64,

    buffer: Vec<u8>,
}

impl RecordSource<BufReader<File>> {
    /// Open a CSV file for streaming
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::NotFound(format!("File not found: {}", path.display())));
        }

        let file = File::open(path).map_err(|e| {
            AppError::IoError(format!("File is not readable: {} ({})", path.display(), e))
        })?;

        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            delimiter: b',',
            escape: b'\\',
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set custom escape character
    pub fn with_escape(mut self, escape: u8) -> Self {
        self.escape = escape;
        self
    }

    /// Cap on the bytes buffered for one logical record
    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes.max(1);
        self
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Read the next record, `None` once the input is exhausted.
    ///
    /// An empty line yields a record with a single empty field.
    pub fn next_record(&mut self) -> Result<Option<RawRecord>> {
        self.buffer.clear();

        if self.read_physical_line()? == 0 {
            return Ok(None);
        }
        let start_line = self.line_number;

        let mut scanner = QuoteScanner::new(self.delimiter, self.escape);
        let bom = if start_line == 1 && self.buffer.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
        scanner.feed(&self.buffer[bom..]);
        while scanner.is_open() {
            if self.buffer.len() > self.max_record_bytes {
                return Err(AppError::ParseError(format!(
                    "Quoted field starting on line {} exceeds {} bytes",
                    start_line, self.max_record_bytes
                )));
            }

            let scanned = self.buffer.len();
            if self.read_physical_line()? == 0 {
                return Err(AppError::ParseError(format!(
                    "Unterminated quoted field starting on line {}",
                    start_line
                )));
            }
            scanner.feed(&self.buffer[scanned..]);
        }

        let mut line: &[u8] = &self.buffer;
        if start_line == 1 {
            line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
        }
        let line = strip_line_terminator(line);

        if line.is_empty() {
            return Ok(Some(RawRecord::blank()));
        }

        let text = decode_line(line);
        self.parse_line(&text, start_line).map(Some)
    }

    fn read_physical_line(&mut self) -> Result<usize> {
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|e| AppError::IoError(format!("Failed to read CSV input: {}", e)))?;
        if read > 0 {
            self.line_number += 1;
        }
        Ok(read)
    }

    fn parse_line(&self, text: &str, start_line: u64) -> Result<RawRecord> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .escape(Some(self.escape))
            .trim(Trim::None)
            .flexible(true)
            .from_reader(text.as_bytes());

        let parse_error = |e: csv::Error| {
            AppError::ParseError(format!("Failed to parse CSV line {}: {}", start_line, e))
        };

        let mut record = StringRecord::new();
        if !reader.read_record(&mut record).map_err(parse_error)? {
            return Ok(RawRecord::blank());
        }

        // Framing and the parser must agree on one record per logical line
        let mut trailing = StringRecord::new();
        if reader.read_record(&mut trailing).map_err(parse_error)? {
            return Err(AppError::ParseError(format!(
                "CSV line {} holds more than one record",
                start_line
            )));
        }

        Ok(RawRecord::new(record.iter().map(str::to_string).collect()))
    }
}

impl<R: BufRead> Iterator for RecordSource<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Tracks whether framed bytes end inside a quoted field.
///
/// A quote only opens a field when it is the field's first byte; anywhere
/// else in an unquoted field it is a literal, as the `csv` parser reads it.
#[derive(Debug)]
struct QuoteScanner {
    delimiter: u8,
    escape: u8,
    in_quotes: bool,
    at_field_start: bool,
    /// Last byte was a quote inside a quoted field: closes it unless doubled
    quote_pending: bool,
    /// Last byte was the escape character inside a quoted field
    escaped: bool,
}

impl QuoteScanner {
    fn new(delimiter: u8, escape: u8) -> Self {
        Self {
            delimiter,
            escape,
            in_quotes: false,
            at_field_start: true,
            quote_pending: false,
            escaped: false,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.in_quotes {
                if self.escaped {
                    self.escaped = false;
                    continue;
                }
                if self.quote_pending {
                    self.quote_pending = false;
                    if byte == b'"' {
                        continue;
                    }
                    self.in_quotes = false;
                } else {
                    if byte == b'"' {
                        self.quote_pending = true;
                    } else if byte == self.escape {
                        self.escaped = true;
                    }
                    continue;
                }
            }

            if byte == self.delimiter || byte == b'\n' || byte == b'\r' {
                self.at_field_start = true;
            } else if byte == b'"' && self.at_field_start {
                self.in_quotes = true;
                self.at_field_start = false;
            } else {
                self.at_field_start = false;
            }
        }
    }

    fn is_open(&self) -> bool {
        self.in_quotes && !self.quote_pending
    }
}

/// Count data records (header excluded) without keeping any of them.
///
/// A record that fails to frame still counts as one row.
pub fn count_data_rows(path: &Path) -> Result<u64> {
    let mut source = RecordSource::open(path)?;
    match source.next_record() {
        Ok(None) => return Ok(0),
        Ok(Some(_)) | Err(AppError::ParseError(_)) => {}
        Err(e) => return Err(e),
    }

    let mut count = 0;
    loop {
        match source.next_record() {
            Ok(Some(_)) | Err(AppError::ParseError(_)) => count += 1,
            Ok(None) => return Ok(count),
            Err(e) => return Err(e),
        }
    }
}

fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// UTF-8 first, Windows-1252 for anything else
fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}
