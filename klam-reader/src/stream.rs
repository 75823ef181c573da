// klam-reader - Byte stream values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Stream value kind: an opaque byte I/O capability supplied by the host.
//!
//! A [`KlamStream`] wraps a [`BytePort`] together with the direction it was
//! opened for. Closing a stream drops the port; any later read or write is
//! reported as [`StreamError::Closed`] rather than touching the port.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read, Write};
use std::rc::Rc;

use thiserror::Error;

/// Errors raised by stream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream {0} is closed")]
    Closed(String),
    #[error("stream {0} is not open for reading")]
    NotReadable(String),
    #[error("stream {0} is not open for writing")]
    NotWritable(String),
    /// The host never configured this capability.
    #[error("{0} not supported")]
    Unsupported(String),
    #[error("I/O error on stream {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Which operations a stream permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    Both,
}

impl Direction {
    fn readable(self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }

    fn writable(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }
}

/// Host side of a stream.
pub trait BytePort {
    /// Next byte, or `None` at end of stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any [`Read`] implementation.
pub struct ReaderPort<R>(pub R);

impl<R: Read> BytePort for ReaderPort<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.0.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn write_byte(&mut self, _byte: u8) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "read-only port"))
    }
}

/// Adapts any [`Write`] implementation.
pub struct WriterPort<W>(pub W);

impl<W: Write> BytePort for WriterPort<W> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "write-only port"))
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.0.write_all(&[byte])?;
        if byte == b'\n' {
            self.0.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// In-memory port, useful for tests and string-backed input.
#[derive(Debug, Default, Clone)]
pub struct BufferPort {
    input: Vec<u8>,
    position: usize,
    output: Rc<RefCell<Vec<u8>>>,
}

impl BufferPort {
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        BufferPort {
            input: input.into(),
            position: 0,
            output: Rc::default(),
        }
    }

    /// Shared handle to everything written so far.
    pub fn output(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.output)
    }
}

impl BytePort for BufferPort {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.input.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.borrow_mut().push(byte);
        Ok(())
    }
}

struct StreamInner {
    name: String,
    direction: Direction,
    /// `None` once closed.
    port: RefCell<Option<Box<dyn BytePort>>>,
    /// Capability name reported when the host supplied no port at all.
    unsupported: Option<String>,
}

/// A guest stream value. Clones share the same port.
#[derive(Clone)]
pub struct KlamStream {
    inner: Rc<StreamInner>,
}

impl KlamStream {
    pub fn new(
        name: impl Into<String>,
        direction: Direction,
        port: impl BytePort + 'static,
    ) -> Self {
        KlamStream {
            inner: Rc::new(StreamInner {
                name: name.into(),
                direction,
                port: RefCell::new(Some(Box::new(port))),
                unsupported: None,
            }),
        }
    }

    /// A placeholder stream whose every operation fails with
    /// [`StreamError::Unsupported`] naming `capability`.
    pub fn unsupported(name: impl Into<String>, capability: impl Into<String>) -> Self {
        KlamStream {
            inner: Rc::new(StreamInner {
                name: name.into(),
                direction: Direction::Both,
                port: RefCell::new(None),
                unsupported: Some(capability.into()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn direction(&self) -> Direction {
        self.inner.direction
    }

    pub fn is_closed(&self) -> bool {
        self.inner.unsupported.is_none() && self.inner.port.borrow().is_none()
    }

    pub fn ptr_eq(&self, other: &KlamStream) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn with_port<T>(
        &self,
        f: impl FnOnce(&mut dyn BytePort) -> io::Result<T>,
    ) -> Result<T, StreamError> {
        if let Some(capability) = &self.inner.unsupported {
            return Err(StreamError::Unsupported(capability.clone()));
        }
        let mut slot = self.inner.port.borrow_mut();
        let port = slot
            .as_deref_mut()
            .ok_or_else(|| StreamError::Closed(self.inner.name.clone()))?;
        f(port).map_err(|source| StreamError::Io {
            name: self.inner.name.clone(),
            source,
        })
    }

    /// Read one byte; `None` at end of stream.
    pub fn read_byte(&self) -> Result<Option<u8>, StreamError> {
        if self.inner.unsupported.is_none() && !self.inner.direction.readable() {
            return Err(StreamError::NotReadable(self.inner.name.clone()));
        }
        self.with_port(|port| port.read_byte())
    }

    pub fn write_byte(&self, byte: u8) -> Result<(), StreamError> {
        if self.inner.unsupported.is_none() && !self.inner.direction.writable() {
            return Err(StreamError::NotWritable(self.inner.name.clone()));
        }
        self.with_port(|port| port.write_byte(byte))
    }

    /// Close the stream. Closing twice is an error.
    pub fn close(&self) -> Result<(), StreamError> {
        self.with_port(|port| port.close())?;
        self.inner.port.borrow_mut().take();
        Ok(())
    }
}

impl fmt::Debug for KlamStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Stream {}>", self.inner.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_round_trip() {
        let port = BufferPort::new("ab");
        let output = port.output();
        let stream = KlamStream::new("buffer", Direction::Both, port);

        assert_eq!(stream.read_byte().unwrap(), Some(b'a'));
        assert_eq!(stream.read_byte().unwrap(), Some(b'b'));
        assert_eq!(stream.read_byte().unwrap(), None);

        stream.write_byte(b'z').unwrap();
        assert_eq!(output.borrow().as_slice(), b"z");
    }

    #[test]
    fn test_closed_stream_reports_error() {
        let stream = KlamStream::new("in", Direction::In, BufferPort::new("x"));
        stream.close().unwrap();
        assert!(stream.is_closed());
        assert!(matches!(stream.read_byte(), Err(StreamError::Closed(_))));
        assert!(matches!(stream.close(), Err(StreamError::Closed(_))));
    }

    #[test]
    fn test_direction_is_enforced() {
        let stream = KlamStream::new("in", Direction::In, BufferPort::new(""));
        assert!(matches!(
            stream.write_byte(1),
            Err(StreamError::NotWritable(_))
        ));
    }

    #[test]
    fn test_unsupported_stream() {
        let stream = KlamStream::unsupported("stoutput", "standard output");
        match stream.write_byte(b'x') {
            Err(StreamError::Unsupported(what)) => assert_eq!(what, "standard output"),
            other => panic!("expected unsupported, got {:?}", other.err()),
        }
    }
}
