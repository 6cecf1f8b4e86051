//! Incremental SSE frame decoder for the upstream enhancement stream.
//!
//! The upstream body arrives as arbitrary byte chunks; frames are delimited
//! by a blank line and may be split anywhere, including mid-UTF-8. The
//! decoder buffers until a full frame is available and yields the joined
//! `data:` payload of each frame. Comment lines (`:`) and `event:`/`id:`
//! fields are skipped — the payload JSON carries its own event tag.

/// Sentinel data payload that terminates a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns the `data` payloads of every frame
    /// completed by it, in arrival order.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some((end, delim_len)) = find_frame_end(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..end + delim_len).take(end).collect();
            if let Some(data) = parse_frame_data(&frame) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Drains any trailing data left when the upstream closes without a
    /// final blank line (seen with proxies that cut the connection early).
    pub fn finish(&mut self) -> Vec<String> {
        if self.buf.is_empty() {
            return Vec::new();
        }
        let frame = std::mem::take(&mut self.buf);
        parse_frame_data(&frame).into_iter().collect()
    }
}

/// Length of the line terminator starting at `i`: `\n` or `\r\n`. Zero when
/// `i` is not at a terminator (an unpaired trailing `\r` waits for the next
/// chunk).
fn terminator_len(buf: &[u8], i: usize) -> usize {
    match buf.get(i) {
        Some(b'\n') => 1,
        Some(b'\r') if buf.get(i + 1) == Some(&b'\n') => 2,
        _ => 0,
    }
}

/// A frame ends at the first blank line: two consecutive line terminators,
/// in any mix of `\n` and `\r\n`.
fn find_frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i < buf.len() {
        let first = terminator_len(buf, i);
        if first == 0 {
            i += 1;
            continue;
        }
        let second = terminator_len(buf, i + first);
        if second != 0 {
            return Some((i, first + second));
        }
        i += first;
    }
    None
}

fn parse_frame_data(frame: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(frame);
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(data_lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push_chunk(b"data: {\"delta\":\"hi\"}\n\n");
        assert_eq!(payloads, vec!["{\"delta\":\"hi\"}"]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push_chunk(b"data: {\"delta\":\"hel").is_empty());
        let payloads = decoder.push_chunk(b"lo\"}\n\ndata: [DONE]\n\n");
        assert_eq!(payloads, vec!["{\"delta\":\"hello\"}", DONE_SENTINEL]);
    }

    #[test]
    fn test_crlf_frames() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push_chunk(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[test]
    fn test_mixed_terminator_frames() {
        // Some proxies rewrite one of the two terminators of the blank line.
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push_chunk(b"data: a\n\r\ndata: b\r\n\n");
        assert_eq!(payloads, vec!["a", "b"]);
    }

    #[test]
    fn test_trailing_carriage_return_waits_for_next_chunk() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push_chunk(b"data: a\n\r").is_empty());
        assert_eq!(decoder.push_chunk(b"\n"), vec!["a"]);
    }

    #[test]
    fn test_comments_and_fields_skipped() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push_chunk(b": keep-alive\n\nevent: message\nid: 3\ndata: x\n\n");
        assert_eq!(payloads, vec!["x"]);
    }

    #[test]
    fn test_multiline_data_joined() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push_chunk(b"data: line1\ndata: line2\n\n");
        assert_eq!(payloads, vec!["line1\nline2"]);
    }

    #[test]
    fn test_finish_flushes_trailing_frame() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push_chunk(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), vec!["tail"]);
        assert!(decoder.finish().is_empty());
    }
}
