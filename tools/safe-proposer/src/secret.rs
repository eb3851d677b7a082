//! Passphrase acquisition: environment first, masked interactive prompt otherwise.

use std::io::{self, IsTerminal, Read, Write};

use crossterm::terminal;
use zeroize::{Zeroize, Zeroizing};

use crate::masked::MaskedWriter;

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const DEL: u8 = 0x7f;
const ERASE: &[u8] = b"\x08 \x08";

/// Reads a secret line from `input`, echoing it masked through `output`.
pub struct SecretResolver<R, W> {
    input: R,
    output: MaskedWriter<W>,
}

impl<R: Read, W: Write> SecretResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output: MaskedWriter::new(output),
        }
    }

    /// Return `env_secret` untouched if present, otherwise prompt for one.
    ///
    /// An empty line yields an empty secret; callers decide whether that is acceptable.
    pub fn resolve(&mut self, env_secret: Option<&str>, prompt: &str) -> io::Result<Zeroizing<String>> {
        if let Some(secret) = env_secret {
            return Ok(Zeroizing::new(secret.to_string()));
        }
        self.prompt(prompt)?;
        let secret = self.read_masked();
        self.finish()?;
        secret
    }

    pub fn output(&self) -> &W {
        self.output.get_ref()
    }

    fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        self.output.unmute();
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()
    }

    /// Read up to a line terminator. Muted for the whole read, unmuted again on every exit path.
    fn read_masked(&mut self) -> io::Result<Zeroizing<String>> {
        self.output.mute();
        let line = self.read_line();
        self.output.unmute();
        line
    }

    fn read_line(&mut self) -> io::Result<Zeroizing<String>> {
        let mut buf = Zeroizing::new(Vec::new());
        let mut byte = [0u8; 1];
        loop {
            if self.input.read(&mut byte)? == 0 {
                break;
            }
            match byte[0] {
                b'\n' | b'\r' | CTRL_D => break,
                CTRL_C => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "password entry aborted"));
                }
                BACKSPACE | DEL => {
                    for _ in 0..pop_char(&mut buf) {
                        self.output.write_unmasked(ERASE)?;
                    }
                }
                b => {
                    buf.push(b);
                    self.output.write_all(&byte)?;
                    self.output.flush()?;
                }
            }
        }

        let bytes = std::mem::take(&mut *buf);
        String::from_utf8(bytes).map(Zeroizing::new).map_err(|e| {
            e.into_bytes().zeroize();
            io::Error::new(io::ErrorKind::InvalidData, "password is not valid UTF-8")
        })
    }

    fn finish(&mut self) -> io::Result<()> {
        self.output.write_all(b"\n")?;
        self.output.flush()
    }
}

/// Remove the last UTF-8 character from `buf`, returning how many bytes it occupied.
fn pop_char(buf: &mut Vec<u8>) -> usize {
    let mut removed = 0;
    while let Some(b) = buf.pop() {
        removed += 1;
        if b & 0b1100_0000 != 0b1000_0000 {
            break;
        }
    }
    removed
}

/// Keeps the terminal in raw mode (no kernel echo, no line buffering) while alive.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Resolve the keystore password for this process.
///
/// Uses `env_secret` if given. Otherwise prompts on stderr and reads stdin; on a terminal,
/// kernel echo is disabled for the duration of the read so only masks are shown.
pub fn resolve_secret(env_secret: Option<&str>, prompt: &str) -> io::Result<Zeroizing<String>> {
    if let Some(secret) = env_secret {
        tracing::debug!("using password from environment");
        return Ok(Zeroizing::new(secret.to_string()));
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut resolver = SecretResolver::new(stdin.lock(), io::stderr());
    resolver.prompt(prompt)?;
    let raw = if interactive {
        Some(RawModeGuard::enable()?)
    } else {
        None
    };
    let secret = resolver.read_masked();
    // Leave raw mode before the newline so the terminal translates it again.
    drop(raw);
    resolver.finish()?;
    secret
}
