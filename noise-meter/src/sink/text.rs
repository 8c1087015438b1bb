//! Fixed-width decimal readout over a byte stream.

use embedded_io::Write;

use super::{Reading, Sink};

/// Greeting written by [`Sink::start`].
pub const BANNER: &[u8] = b"Noisemeter\n";

/// Writes each reading as `"HTUdB\n"`: three digit positions with the
/// hundreds digit blanked when zero.
///
/// ```text
///   5 dB -> " 05dB\n"
///  72 dB -> " 72dB\n"
/// 104 dB -> "104dB\n"
/// ```
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        TextSink { writer }
    }

    pub fn free(self) -> W {
        self.writer
    }

    /// Render `display` (already clamped to `0..=999`).
    pub fn format(display: u16) -> [u8; 6] {
        let mut n = display.min(999);
        let mut line = [b' ', b'0', b'0', b'd', b'B', b'\n'];
        line[2] = b'0' + (n % 10) as u8;
        n /= 10;
        line[1] = b'0' + (n % 10) as u8;
        n /= 10;
        if n != 0 {
            line[0] = b'0' + n as u8;
        }
        line
    }
}

impl<W: Write> Sink for TextSink<W> {
    type Error = W::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.writer.write_all(BANNER)?;
        self.writer.flush()
    }

    fn dispatch(&mut self, reading: &Reading) -> Result<(), Self::Error> {
        self.writer.write_all(&Self::format(reading.display))?;
        self.writer.flush()
    }
}
