//! Incremental `text/event-stream` decoding.
//!
//! Bytes arrive in arbitrary chunks; complete events come out. Lines end in
//! `\n` or `\r\n`. A lone `\r` is not treated as a line break.

/// Event type reported when the stream names none.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
    /// Last event id seen on the stream at dispatch time.
    pub id: Option<String>,
}

impl ServerEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct EventDecoder {
    line: Vec<u8>,
    event: String,
    data: String,
    last_event_id: Option<String>,
    retry_ms: Option<u64>,
    started: bool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk and returns every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                let mut line = std::mem::take(&mut self.line);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                if let Some(event) = self.process_line(&line) {
                    events.push(event);
                }
            } else {
                self.line.push(byte);
            }
        }
        events
    }

    /// Drops partially received state before a new connection. The last event
    /// id survives so it can be sent back on reconnect.
    pub fn reset(&mut self) {
        self.line.clear();
        self.event.clear();
        self.data.clear();
        self.started = false;
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay most recently advertised by the server.
    pub fn retry_ms(&self) -> Option<u64> {
        self.retry_ms
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<ServerEvent> {
        let mut line = String::from_utf8_lossy(raw).into_owned();
        if !self.started {
            self.started = true;
            if let Some(stripped) = line.strip_prefix('\u{feff}') {
                line = stripped.to_string();
            }
        }

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_str(), ""),
        };

        match field {
            "event" => self.event = value.to_string(),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" if !value.contains('\0') => {
                self.last_event_id = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                self.retry_ms = value.parse().ok();
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<ServerEvent> {
        let event = std::mem::take(&mut self.event);
        if self.data.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        Some(ServerEvent {
            event: if event.is_empty() {
                DEFAULT_EVENT_TYPE.to_string()
            } else {
                event
            },
            data,
            id: self.last_event_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_event_split_across_chunks() {
        let mut decoder = EventDecoder::new();
        assert!(decoder.feed(b"event: newRea").is_empty());
        assert!(decoder.feed(b"ding\r\nid: 17\r\ndata: {\"identifier\":1}\r").is_empty());
        let events = decoder.feed(b"\n\r\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "newReading");
        assert_eq!(events[0].data, "{\"identifier\":1}");
        assert_eq!(events[0].id.as_deref(), Some("17"));
    }

    #[test]
    fn joins_multiline_data_and_defaults_event_type() {
        let mut decoder = EventDecoder::new();
        let events = decoder.feed(b"data: first\ndata:second\n\n");
        assert_eq!(events, vec![ServerEvent::new("message", "first\nsecond")]);
    }

    #[test]
    fn ignores_comments_and_empty_events() {
        let mut decoder = EventDecoder::new();
        let events = decoder.feed(b": keep-alive\n\nevent: ping\n\ndata: x\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
    }

    #[test]
    fn records_retry_and_keeps_id_across_reset() {
        let mut decoder = EventDecoder::new();
        decoder.feed(b"retry: 1500\nid: 9\nretry: soon\ndata: a\n\n");
        assert_eq!(decoder.retry_ms(), Some(1500));

        decoder.feed(b"data: partial");
        decoder.reset();
        assert_eq!(decoder.last_event_id(), Some("9"));
        assert!(decoder.feed(b"\n\n").is_empty());
    }

    #[test]
    fn strips_leading_byte_order_mark() {
        let mut decoder = EventDecoder::new();
        let events = decoder.feed("\u{feff}data: hi\n\n".as_bytes());
        assert_eq!(events[0].data, "hi");
    }
}
