// RecordReader Module
// TK Ales, 2024
// Version 1.0 - Line-oriented record scanner for RSA500 CSV exports

use std::io::BufRead;

use crate::rsa500_tools::{Result, Rsa500Error};

// Initial csv buffer size; lines in these exports are short.
const LINE_BUFFER_CAPACITY: usize = 256;

/// One input line split into its comma-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source file.
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// True for a section marker such as `[Traces]`: a single field equal to `name`.
    pub fn is_marker(&self, name: &str) -> bool {
        self.fields.len() == 1 && self.fields[0] == name
    }

    /// Field at `index`, or a `MalformedInput` error naming `step`.
    pub fn require(&self, index: usize, step: &'static str) -> Result<&str> {
        self.field(index).ok_or_else(|| {
            Rsa500Error::malformed(
                self.line,
                step,
                format!("expected at least {} fields, found {}", index + 1, self.len()),
            )
        })
    }
}

/// Reads one record per line, stripping NUL bytes before splitting on commas.
///
/// Blank lines are returned as records with no fields so that positional
/// skips stay aligned with the physical layout of the file. A quoted field
/// that runs past the end of a line pulls in the following lines, so one
/// record may span several lines; `Record::line` is the line it starts on.
/// Quotes are matched by counting, so a stray `"` inside an unquoted field
/// also joins lines.
pub struct RecordReader<R> {
    inner: R,
    line: usize,
    buf: String,
    builder: csv::ReaderBuilder,
    record: csv::StringRecord,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .buffer_capacity(LINE_BUFFER_CAPACITY);

        RecordReader {
            inner,
            line: 0,
            buf: String::new(),
            builder,
            record: csv::StringRecord::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next record, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let Some(mut text) = self.read_clean_line()? else {
            return Ok(None);
        };
        let start_line = self.line;

        while has_open_quote(&text) {
            match self.read_clean_line()? {
                Some(more) => {
                    text.push('\n');
                    text.push_str(&more);
                }
                None => break,
            }
        }

        let fields = self.split_fields(&text)?;
        Ok(Some(Record {
            line: start_line,
            fields,
        }))
    }

    fn read_clean_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;

        let text = self.buf.trim_end_matches(['\n', '\r']);
        Ok(Some(text.chars().filter(|&c| c != '\0').collect()))
    }

    fn split_fields(&mut self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = self.builder.from_reader(text.as_bytes());
        if reader.read_record(&mut self.record)? {
            Ok(self.record.iter().map(str::to_string).collect())
        } else {
            Ok(Vec::new())
        }
    }

    /// Read the next record; running out of input is a `MalformedInput` error.
    pub fn expect_record(&mut self, step: &'static str) -> Result<Record> {
        match self.next_record()? {
            Some(record) => Ok(record),
            None => Err(Rsa500Error::malformed(
                self.line,
                step,
                "unexpected end of input",
            )),
        }
    }

    /// Discard exactly `count` records.
    pub fn skip(&mut self, count: usize, step: &'static str) -> Result<()> {
        for _ in 0..count {
            let record = self.expect_record(step)?;
            log::trace!("skipping line {}: {:?}", record.line, record.fields);
        }
        Ok(())
    }

    /// Read forward until a record satisfies `matches` and return it.
    pub fn scan_until<F>(&mut self, step: &'static str, mut matches: F) -> Result<Record>
    where
        F: FnMut(&Record) -> bool,
    {
        loop {
            let record = self.expect_record(step)?;
            if matches(&record) {
                log::trace!("{} matched at line {}", step, record.line);
                return Ok(record);
            }
        }
    }
}

fn has_open_quote(text: &str) -> bool {
    text.bytes().filter(|&b| b == b'"').count() % 2 == 1
}
