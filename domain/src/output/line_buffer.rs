//! Line reassembly for chunked text output.

/// Accumulates the unterminated tail of a byte stream.
///
/// Invariant: the buffered tail never contains `b'\n'`. Every complete line
/// is emitted as soon as the write that terminates it arrives. Bytes are kept
/// as written and only decoded (lossily) when a record is emitted, so a
/// multi-byte character split across writes comes out intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    tail: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of output, emitting each completed line (without its newline).
    pub fn write(&mut self, chunk: impl AsRef<[u8]>, mut emit: impl FnMut(String)) {
        let chunk = chunk.as_ref();
        let Some(nl) = chunk.iter().position(|&b| b == b'\n') else {
            self.tail.extend_from_slice(chunk);
            return;
        };

        // The first line continues whatever was buffered before
        let mut first = std::mem::take(&mut self.tail);
        first.extend_from_slice(&chunk[..nl]);
        emit(decode(&first));

        let mut rest = &chunk[nl + 1..];
        while let Some(nl) = rest.iter().position(|&b| b == b'\n') {
            emit(decode(&rest[..nl]));
            rest = &rest[nl + 1..];
        }

        self.tail.extend_from_slice(rest);
    }

    /// Emit the buffered tail as a final record, if there is one.
    pub fn flush(&mut self, mut emit: impl FnMut(String)) {
        if !self.tail.is_empty() {
            emit(decode(&std::mem::take(&mut self.tail)));
        }
    }

    /// The current unterminated tail.
    pub fn pending(&self) -> &[u8] {
        &self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
