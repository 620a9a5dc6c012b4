//! Incremental parsing of an uploaded JSON array.
//!
//! The upload buffer is scanned element by element; only one element is ever
//! decoded into a record at a time, so memory stays proportional to the
//! largest single record rather than to the record count.

use crate::ingest::error::ImportError;
use crate::ingest::record::{FlatRecord, FlatUpload, HouseRecord, HouseUpload};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Pull-iterator over the raw byte slices of the elements of a JSON array.
///
/// Structural problems (not an array, unbalanced braces, trailing garbage)
/// surface as errors from `next_element`. Element content is not interpreted
/// here beyond the bracket and string structure needed to find boundaries.
pub struct JsonArrayElements<'a> {
    input: &'a [u8],
    pos: usize,
    done: bool,
    first: bool,
}

impl<'a> JsonArrayElements<'a> {
    /// Positions the scanner just past the opening `[`. Fails if the input
    /// does not start with a JSON array.
    pub fn new(input: &'a [u8]) -> Result<Self, ImportError> {
        let mut pos = 0;
        while pos < input.len() && input[pos].is_ascii_whitespace() {
            pos += 1;
        }

        match input.get(pos) {
            Some(b'[') => Ok(Self {
                input,
                pos: pos + 1,
                done: false,
                first: true,
            }),
            Some(other) => Err(ImportError::Structural(format!(
                "expected a JSON array, found '{}'",
                char::from(*other)
            ))),
            None => Err(ImportError::Structural(
                "expected a JSON array, found empty input".into(),
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Next raw element slice, `Ok(None)` once the closing `]` is consumed.
    pub fn next_element(&mut self) -> Result<Option<&'a [u8]>, ImportError> {
        if self.done {
            return Ok(None);
        }

        self.skip_whitespace();

        match self.input.get(self.pos) {
            Some(b']') => {
                self.pos += 1;
                self.finish()?;
                return Ok(None);
            },
            Some(b',') if !self.first => {
                self.pos += 1;
                self.skip_whitespace();
            },
            Some(_) if self.first => {},
            Some(other) => {
                return Err(ImportError::Structural(format!(
                    "expected ',' or ']' between array elements, found '{}'",
                    char::from(*other)
                )));
            },
            None => {
                return Err(ImportError::Structural(
                    "unterminated JSON array".into(),
                ));
            },
        }

        self.first = false;

        // A ',' may be immediately followed by the array close only in
        // malformed input; report it rather than yielding an empty slice.
        if self.input.get(self.pos) == Some(&b']') {
            return Err(ImportError::Structural(
                "expected an array element, found ']'".into(),
            ));
        }

        let start = self.pos;
        let end = self.scan_element()?;
        Ok(Some(&self.input[start..end]))
    }

    /// Advances past one JSON value and returns its end offset. Tracks string
    /// and escape state so braces inside strings do not count as structure.
    fn scan_element(&mut self) -> Result<usize, ImportError> {
        let mut depth: i64 = 0;
        let mut in_string = false;
        let mut escaped = false;

        while self.pos < self.input.len() {
            let byte = self.input[self.pos];

            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
                self.pos += 1;
                continue;
            }

            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    if depth == 0 {
                        // Closing bracket of the outer array terminates a
                        // bare scalar element.
                        return Ok(self.pos);
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(self.pos);
                    }
                },
                b',' if depth == 0 => return Ok(self.pos),
                _ => {},
            }

            self.pos += 1;
        }

        Err(ImportError::Structural(
            "unterminated JSON array element".into(),
        ))
    }

    /// After the closing `]`, only whitespace may remain.
    fn finish(&mut self) -> Result<(), ImportError> {
        self.skip_whitespace();
        self.done = true;
        if self.pos < self.input.len() {
            return Err(ImportError::Structural(
                "unexpected data after end of JSON array".into(),
            ));
        }
        Ok(())
    }
}

/// An array element that can be decoded and checked into a writable record.
pub trait UploadElement: DeserializeOwned {
    type Record;

    fn into_record(self) -> Result<Self::Record, ImportError>;
}

impl UploadElement for FlatUpload {
    type Record = FlatRecord;

    fn into_record(self) -> Result<FlatRecord, ImportError> {
        self.validate()
    }
}

impl UploadElement for HouseUpload {
    type Record = HouseRecord;

    fn into_record(self) -> Result<HouseRecord, ImportError> {
        self.validate()
    }
}

/// Streams validated records out of an uploaded JSON array.
///
/// Decode failures are structural, constraint violations come back as
/// validation errors from the record itself. Either stops the stream; the
/// attempt is already lost at that point.
pub struct RecordStream<'a, U> {
    elements: JsonArrayElements<'a>,
    index: usize,
    _upload: PhantomData<U>,
}

pub type FlatRecordStream<'a> = RecordStream<'a, FlatUpload>;
pub type HouseRecordStream<'a> = RecordStream<'a, HouseUpload>;

impl<'a, U: UploadElement> RecordStream<'a, U> {
    pub fn new(input: &'a [u8]) -> Result<Self, ImportError> {
        Ok(Self {
            elements: JsonArrayElements::new(input)?,
            index: 0,
            _upload: PhantomData,
        })
    }

    /// Next validated record, `Ok(None)` at the end of the array.
    pub fn next_record(&mut self) -> Result<Option<U::Record>, ImportError> {
        let raw = match self.elements.next_element()? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        self.index += 1;
        let ordinal = self.index;

        let upload: U = serde_json::from_slice(raw).map_err(|e| {
            ImportError::Structural(format!("element {} is not a valid record: {}", ordinal, e))
        })?;

        upload
            .into_record()
            .map(Some)
            .map_err(|e| e.with_ordinal(ordinal))
    }
}
