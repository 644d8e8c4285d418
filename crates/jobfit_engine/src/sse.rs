//! Incremental decoder for `text/event-stream` bodies.
//!
//! Only the `data` field is kept; the server sends unnamed events. Lines are
//! terminated by `\n`, with an optional preceding `\r`.

use bytes::BytesMut;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk and returns every message it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.buffer.extend_from_slice(chunk);
        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw = self.buffer.split_to(pos + 1);
            let decoded = String::from_utf8_lossy(&raw[..pos]);
            let line: &str = decoded.strip_suffix('\r').unwrap_or(&decoded);
            if let Some(message) = self.process_line(line) {
                messages.push(message);
            }
        }
        messages
    }

    fn process_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseMessage { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_split_across_chunks_are_reassembled() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"sta").is_empty());
        assert!(decoder.push(b"tus\": \"ok\"}\r\n").is_empty());
        let messages = decoder.push(b"\r\ndata: {}\n\n");

        assert_eq!(
            messages,
            vec![
                SseMessage {
                    data: "{\"status\": \"ok\"}".to_string()
                },
                SseMessage {
                    data: "{}".to_string()
                },
            ]
        );
    }

    #[test]
    fn comments_and_unknown_fields_are_skipped() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.push(b": keepalive\nid: 7\nretry: 100\n\nevent: update\ndata: a\ndata: b\n\n");

        assert_eq!(
            messages,
            vec![SseMessage {
                data: "a\nb".to_string()
            }]
        );
    }

    #[test]
    fn incomplete_trailing_message_is_not_emitted() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: partial\n").is_empty());
    }
}
