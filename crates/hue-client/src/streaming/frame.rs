//! SSE frame reassembly
//!
//! [`ChunkDecoder`] turns raw network chunks into text without splitting
//! multi-byte characters; [`FrameBuffer`] then splits the text into
//! delimiter-bounded frames. A frame ends at a blank line, which on the
//! wire is either a bare `\n\n` or a CRLF `\r\n\r\n`; when both occur, the
//! one at the lower byte offset wins. Partial data stays buffered until
//! its delimiter arrives, so chunk boundaries never affect the recovered
//! frame set.

use tracing::warn;

/// Reset threshold for the accumulation buffer. A healthy stream never gets
/// close; a malformed or adversarial one is dropped and processing resumes.
const MAX_BUFFER_BYTES: usize = 1_000_000;

/// Incremental UTF-8 decoder for the raw byte stream
///
/// A network chunk can end in the middle of a multi-byte character; the
/// undecodable tail is held back and prepended to the next chunk, so the
/// decoded text is independent of where the transport cut the stream.
/// Genuinely invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, buffering any trailing partial character
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let buf = std::mem::take(&mut self.pending);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    return out;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        out.push_str(s);
                    }
                    match e.error_len() {
                        // Invalid sequence mid-stream
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Truncated character: complete it with the next chunk
                        None => {
                            self.pending = after.to_vec();
                            return out;
                        }
                    }
                }
            }
        }
    }
}

/// Locate the earliest frame delimiter, returning `(offset, length)`
fn find_frame_delimiter(buffer: &str) -> Option<(usize, usize)> {
    let unix = buffer.find("\n\n");
    let windows = buffer.find("\r\n\r\n");

    match (unix, windows) {
        (None, None) => None,
        (Some(u), None) => Some((u, 2)),
        (None, Some(w)) => Some((w, 4)),
        // Lower offset wins; the bare-newline form takes the tie
        (Some(u), Some(w)) => {
            if w < u {
                Some((w, 4))
            } else {
                Some((u, 2))
            }
        }
    }
}

/// Rolling buffer that reassembles stream chunks into complete frames
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete frame it unlocks
    ///
    /// Frames that are empty after trimming (keepalive blank frames) are
    /// dropped. The remainder past the last delimiter stays buffered.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);

        if self.buffer.len() > MAX_BUFFER_BYTES {
            warn!(
                buffer_len = self.buffer.len(),
                "resetting oversized event stream buffer"
            );
            self.buffer.clear();
            return Vec::new();
        }

        let mut frames = Vec::new();
        while let Some((index, length)) = find_frame_delimiter(&self.buffer) {
            let frame = self.buffer[..index].to_string();
            self.buffer.drain(..index + length);

            if frame.trim().is_empty() {
                continue;
            }
            frames.push(frame);
        }
        frames
    }

    /// Bytes currently buffered awaiting a delimiter
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}
