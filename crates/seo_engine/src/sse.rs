use std::collections::VecDeque;

use encoding_rs::{Decoder, UTF_8};

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental decoder for a `text/event-stream` body.
///
/// Chunks may split lines and UTF-8 sequences at arbitrary byte offsets.
/// A frame is dispatched on a blank line; frames without `data` are dropped.
pub struct SseDecoder {
    utf8: Decoder,
    line: String,
    pending_cr: bool,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    ready: VecDeque<SseFrame>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            utf8: UTF_8.new_decoder_with_bom_removal(),
            line: String::new(),
            pending_cr: false,
            event: None,
            data: Vec::new(),
            id: None,
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Feeds a chunk and returns every frame it completed, in order.
    ///
    /// Input after [`SseDecoder::finish`] is ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        if self.finished {
            return Vec::new();
        }
        let text = self.decode(chunk, false);
        self.consume_text(&text);
        self.ready.drain(..).collect()
    }

    /// Flushes a trailing frame that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if self.finished {
            return self.ready.pop_front();
        }
        self.finished = true;
        let text = self.decode(&[], true);
        self.consume_text(&text);
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            self.process_line(&line);
        }
        self.dispatch();
        self.ready.pop_front()
    }

    fn decode(&mut self, bytes: &[u8], last: bool) -> String {
        let capacity = self
            .utf8
            .max_utf8_buffer_length(bytes.len())
            .unwrap_or(bytes.len() * 3 + 4);
        let mut out = String::with_capacity(capacity);
        let _ = self.utf8.decode_to_string(bytes, &mut out, last);
        out
    }

    fn consume_text(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' if self.pending_cr => {
                    self.pending_cr = false;
                }
                '\r' | '\n' => {
                    self.pending_cr = ch == '\r';
                    let line = std::mem::take(&mut self.line);
                    self.process_line(&line);
                }
                _ => {
                    self.pending_cr = false;
                    self.line.push(ch);
                }
            }
        }
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // `retry` and unknown fields carry nothing this client uses.
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let event = self.event.take();
        if self.data.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        self.ready.push_back(SseFrame {
            event,
            data,
            id: self.id.clone(),
        });
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(frames: &[SseFrame]) -> Vec<&str> {
        frames.iter().map(|f| f.data.as_str()).collect()
    }

    #[test]
    fn decodes_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"agent_").is_empty());
        let frames = decoder.feed(b"start\"}\n\ndata: {\"type\":\"complete\"}\n\n");
        assert_eq!(
            data(&frames),
            vec![r#"{"type":"agent_start"}"#, r#"{"type":"complete"}"#]
        );
    }

    #[test]
    fn ignores_comments_and_keeps_metadata() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\n\nevent: message\nid: 7\nretry: 500\ndata: x\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: Some("message".into()),
                data: "x".into(),
                id: Some("7".into()),
            }]
        );
    }

    #[test]
    fn joins_multi_line_data_and_handles_crlf() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: a\r\ndata: b\r\n\r\n");
        assert_eq!(data(&frames), vec!["a\nb"]);
    }

    #[test]
    fn crlf_split_between_chunks_is_one_line_break() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: a\r").is_empty());
        let frames = decoder.feed(b"\n\r\n");
        assert_eq!(data(&frames), vec!["a"]);
    }

    #[test]
    fn multibyte_characters_survive_chunk_boundaries() {
        let bytes = "data: héllo\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let frames = decoder.feed(&bytes[split..]);
        assert_eq!(data(&frames), vec!["héllo"]);
    }

    #[test]
    fn finish_flushes_unterminated_frame() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish().map(|f| f.data), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn input_after_finish_is_ignored() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.finish(), None);
        assert!(decoder.feed(b"data: late\n\n").is_empty());
        assert_eq!(decoder.finish(), None);
    }
}
