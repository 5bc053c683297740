use std::io::{self, BufRead, StdinLock};

#[derive(Debug, PartialEq, Eq)]
pub enum InputMessage {
    Line(String),
    Eof,
}

/// Line source for the control loop.
pub struct Input<R: BufRead> {
    reader: R,
    interactive: bool,
}

impl Input<StdinLock<'static>> {
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        let interactive = termion::is_tty(&stdin);
        trace!(interactive, "reading commands from stdin");
        Self::new(stdin.lock(), interactive)
    }
}

impl<R: BufRead> Input<R> {
    pub fn new(reader: R, interactive: bool) -> Self {
        Self {
            reader,
            interactive,
        }
    }

    /// Whether lines come from a terminal. Lines from anywhere else are
    /// echoed so transcripts stay readable.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Reads the next line without its terminator. Bytes that are not
    /// valid UTF-8 become U+FFFD rather than failing the read.
    pub fn next_line(&mut self) -> io::Result<InputMessage> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(InputMessage::Eof);
        }

        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        let line = match String::from_utf8(buf) {
            Ok(line) => line,
            Err(err) => {
                debug!(valid_up_to = err.utf8_error().valid_up_to(), "line is not valid utf-8");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        Ok(InputMessage::Line(line))
    }
}
