//! Output filter that hides typed secrets behind a mask character.

use std::io::{self, Write};

pub const MASK: u8 = b'*';

/// Wraps a sink and, while muted, forwards every byte except line terminators as [`MASK`].
///
/// Masking is length-preserving, so a partial write on the inner sink maps one-to-one
/// onto the caller's buffer. Nothing is buffered here.
#[derive(Debug)]
pub struct MaskedWriter<W> {
    inner: W,
    muted: bool,
}

impl<W: Write> MaskedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, muted: false }
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Forward bytes untouched regardless of the mute state (cursor control, erase sequences).
    pub fn write_unmasked(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)?;
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for MaskedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.muted {
            return self.inner.write(buf);
        }
        let masked: Vec<u8> = buf
            .iter()
            .map(|&b| if b == b'\n' || b == b'\r' { b } else { MASK })
            .collect();
        self.inner.write(&masked)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unmuted_passes_through() {
        let mut w = MaskedWriter::new(Vec::new());
        w.write_all(b"Keystore password: ").unwrap();
        assert_eq!(w.get_ref().as_slice(), b"Keystore password: ");
    }

    #[test]
    fn test_muted_masks_everything_but_terminators() {
        let mut w = MaskedWriter::new(Vec::new());
        w.mute();
        w.write_all(b"ab c\r\nd").unwrap();
        assert_eq!(w.into_inner(), b"****\r\n*");
    }

    #[test]
    fn test_mute_toggles() {
        let mut w = MaskedWriter::new(Vec::new());
        w.mute();
        assert!(w.is_muted());
        w.write_all(b"x").unwrap();
        w.unmute();
        w.write_all(b"y").unwrap();
        assert_eq!(w.into_inner(), b"*y");
    }

    #[test]
    fn test_write_unmasked_ignores_mute() {
        let mut w = MaskedWriter::new(Vec::new());
        w.mute();
        w.write_unmasked(b"\x08 \x08").unwrap();
        assert_eq!(w.into_inner(), b"\x08 \x08");
    }

    #[test]
    fn test_sink_error_propagates() {
        let mut w = MaskedWriter::new(FailingSink);
        w.mute();
        let err = w.write(b"secret").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
