//! Single-pass body streams.

use std::fmt;
use std::io::{self, Cursor, Read};

/// A readable, single-pass message body.
///
/// Once read the stream is exhausted; callers that need the bytes again must
/// keep the buffer they read and wrap it in a new `Body`.
pub struct Body {
    reader: Box<dyn Read + Send>,
}

impl Body {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Reads the remainder of the stream.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_reader(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from_reader(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_single_pass() {
        let mut body = Body::from("hello");
        assert_eq!(body.read_all().unwrap(), b"hello");
        assert!(body.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_empty_body() {
        assert!(Body::empty().read_all().unwrap().is_empty());
    }
}
