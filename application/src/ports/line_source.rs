//! Line source port: blocking, line-at-a-time console input.

use std::sync::mpsc::Receiver;

/// Outcome of one blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line, without its terminator.
    Line(String),
    /// The user pressed Ctrl-C at the prompt.
    Interrupted,
    /// Input is exhausted (Ctrl-D or closed stream).
    Eof,
    /// Reading failed; the source is unusable.
    Failed(String),
}

/// A blocking source of input lines.
///
/// `read_line` may block indefinitely; the caller owns a dedicated thread.
/// Sources are created on the thread that reads from them, so they need
/// not be `Send`.
pub trait LineSource {
    fn read_line(&mut self) -> LineEvent;
}

/// Line source fed through a channel. Yields [`LineEvent::Eof`] once every
/// sender is dropped.
pub struct ChannelLineSource {
    rx: Receiver<LineEvent>,
}

impl ChannelLineSource {
    pub fn new(rx: Receiver<LineEvent>) -> Self {
        Self { rx }
    }
}

impl LineSource for ChannelLineSource {
    fn read_line(&mut self) -> LineEvent {
        self.rx.recv().unwrap_or(LineEvent::Eof)
    }
}
