//! TFRecord container format.
//!
//! A TFRecord file is a sequence of records, each framed as
//!
//! ```text
//! u64  length          (little endian)
//! u32  masked_crc32c(length bytes)
//! [u8] data            (length bytes)
//! u32  masked_crc32c(data)
//! ```
//!
//! The payloads written by this crate are serialized
//! [`Example`](example::Example) protos.

pub mod example;

pub use example::{image_example, Example, Feature, Features};

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use prost::Message;
use thiserror::Error;

const MASK_DELTA: u32 = 0xa282_ead8;

/// Largest payload the reader accepts before treating the length as garbage.
pub const MAX_RECORD_LEN: u64 = 256 * 1024 * 1024;

/// CRC32C as stored in TFRecord framing.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// Errors from reading TFRecord framing.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("record {index} is truncated")]
    Truncated { index: usize },

    #[error("record {index} has a corrupt length header")]
    LengthChecksum { index: usize },

    #[error("record {index} has a corrupt payload")]
    DataChecksum { index: usize },

    #[error("record {index} claims {len} bytes, more than the {max} byte limit")]
    TooLarge { index: usize, len: u64, max: u64 },

    #[error("record {index} is not a valid Example: {source}")]
    Example {
        index: usize,
        #[source]
        source: prost::DecodeError,
    },
}

/// Appends framed records to a byte sink.
pub struct RecordWriter<W: Write> {
    inner: W,
    written: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Writes one framed record.
    pub fn write_record(&mut self, data: &[u8]) -> io::Result<()> {
        let len = (data.len() as u64).to_le_bytes();
        self.inner.write_all(&len)?;
        self.inner.write_all(&masked_crc32c(&len).to_le_bytes())?;
        self.inner.write_all(data)?;
        self.inner.write_all(&masked_crc32c(data).to_le_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Serializes `example` and writes it as one record.
    pub fn write_example(&mut self, example: &Example) -> io::Result<()> {
        self.write_record(&example.encode_to_vec())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Flushes buffered data and returns the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Iterates the records of a TFRecord stream, verifying both checksums.
pub struct RecordReader<R: Read> {
    inner: R,
    index: usize,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            index: 0,
            done: false,
        }
    }

    /// Reads the next payload, or `None` at a clean end of stream.
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>, RecordError> {
        let index = self.index;

        let mut header = [0u8; 8];
        if !self.fill(&mut header, true)? {
            return Ok(None);
        }
        let mut crc = [0u8; 4];
        self.fill(&mut crc, false)?;
        if u32::from_le_bytes(crc) != masked_crc32c(&header) {
            return Err(RecordError::LengthChecksum { index });
        }

        let len = u64::from_le_bytes(header);
        if len > MAX_RECORD_LEN {
            return Err(RecordError::TooLarge {
                index,
                len,
                max: MAX_RECORD_LEN,
            });
        }

        let mut data = vec![0u8; len as usize];
        self.fill(&mut data, false)?;
        self.fill(&mut crc, false)?;
        if u32::from_le_bytes(crc) != masked_crc32c(&data) {
            return Err(RecordError::DataChecksum { index });
        }

        self.index += 1;
        Ok(Some(data))
    }

    /// Reads the next record and decodes it as an [`Example`].
    pub fn read_example(&mut self) -> Result<Option<Example>, RecordError> {
        let index = self.index;
        match self.read_record()? {
            Some(data) => Example::decode(data.as_slice())
                .map(Some)
                .map_err(|source| RecordError::Example { index, source }),
            None => Ok(None),
        }
    }

    /// Fills `buf` completely. Returns `false` only when `eof_ok` is set and
    /// the stream ended before the first byte.
    fn fill(&mut self, buf: &mut [u8], eof_ok: bool) -> Result<bool, RecordError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 && eof_ok => return Ok(false),
                Ok(0) => return Err(RecordError::Truncated { index: self.index }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(RecordError::Io(e)),
            }
        }
        Ok(true)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_record().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Reads every record payload from an in-memory TFRecord buffer.
///
/// Useful for fuzzing and tests without file I/O.
pub fn records_from_slice(bytes: &[u8]) -> Result<Vec<Vec<u8>>, RecordError> {
    RecordReader::new(bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_crc_uses_the_standard_check_value() {
        // crc32c("123456789") is the CRC-32C check value 0xe3069283.
        assert_eq!(crc32c::crc32c(b"123456789"), 0xe306_9283);
        assert_eq!(masked_crc32c(b"123456789"), 0xc78a_b0e5);
    }

    #[test]
    fn framing_layout_is_length_crc_data_crc() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(b"abc").expect("write");
        let bytes = writer.finish().expect("finish");

        assert_eq!(bytes.len(), 8 + 4 + 3 + 4);
        assert_eq!(&bytes[..8], &3u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &masked_crc32c(&3u64.to_le_bytes()).to_le_bytes());
        assert_eq!(&bytes[12..15], b"abc");
        assert_eq!(&bytes[15..], &masked_crc32c(b"abc").to_le_bytes());
    }

    #[test]
    fn reader_returns_records_in_order() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(b"first").expect("write");
        writer.write_record(b"").expect("write");
        writer.write_record(b"third").expect("write");
        assert_eq!(writer.records_written(), 3);
        let bytes = writer.finish().expect("finish");

        let records = records_from_slice(&bytes).expect("read");
        assert_eq!(records, vec![b"first".to_vec(), Vec::new(), b"third".to_vec()]);
    }

    #[test]
    fn empty_stream_has_no_records() {
        assert!(records_from_slice(&[]).expect("read").is_empty());
    }

    #[test]
    fn corrupt_payload_is_detected() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(b"payload").expect("write");
        let mut bytes = writer.finish().expect("finish");
        bytes[13] ^= 0xff;

        let err = records_from_slice(&bytes).unwrap_err();
        assert!(matches!(err, RecordError::DataChecksum { index: 0 }));
    }

    #[test]
    fn corrupt_length_is_detected() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(b"payload").expect("write");
        let mut bytes = writer.finish().expect("finish");
        bytes[0] ^= 0x01;

        let err = records_from_slice(&bytes).unwrap_err();
        assert!(matches!(err, RecordError::LengthChecksum { index: 0 }));
    }

    #[test]
    fn truncated_stream_is_detected() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(b"payload").expect("write");
        let bytes = writer.finish().expect("finish");

        let err = records_from_slice(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, RecordError::Truncated { index: 0 }));
    }
}
