//! Server-sent status updates for the chat screen.
//!
//! The subscription runs on its own task and is closed for good on the first
//! transport error. Dropping the `StatusStream` aborts the task.

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Payload of one server-sent event.
    Message(String),
    /// The stream ended; carries the reason when it failed.
    Closed(Option<String>),
}

/// Incremental parser for `text/event-stream` bodies.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseParser {
    /// Feeds a body chunk and returns every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.line(line) {
                events.push(event);
            }
        }
        events
    }

    fn line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let event = self.data.join("\n");
            self.data.clear();
            return Some(event);
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
}

pub struct StatusStream {
    task: JoinHandle<()>,
    events_rx: UnboundedReceiver<StreamEvent>,
}

impl StatusStream {
    pub fn open(client: Client, url: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let reason = match subscribe(client, &url, &tx).await {
                Ok(()) => None,
                Err(reason) => {
                    warn!("Status stream {url} closed: {reason}");
                    Some(reason)
                }
            };
            let _ = tx.send(StreamEvent::Closed(reason));
        });
        Self {
            task,
            events_rx: rx,
        }
    }

    pub fn poll_event(&mut self) -> Option<StreamEvent> {
        self.events_rx.try_recv().ok()
    }
}

impl Drop for StatusStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn subscribe(
    client: Client,
    url: &str,
    tx: &UnboundedSender<StreamEvent>,
) -> Result<(), String> {
    let response = client
        .get(url)
        .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
        .send()
        .await
        .map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status().as_u16()));
    }
    debug!("Status stream {url} opened");
    let mut parser = SseParser::default();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|err| err.to_string())?;
        for event in parser.feed(&chunk) {
            if tx.send(StreamEvent::Message(event)).is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_end_at_blank_lines() {
        let mut parser = SseParser::default();
        assert!(parser.feed(b"data: indexing faq.pdf\n").is_empty());
        assert_eq!(parser.feed(b"\n"), vec!["indexing faq.pdf"]);
    }

    #[test]
    fn chunks_can_split_lines() {
        let mut parser = SseParser::default();
        assert!(parser.feed(b"data: hal").is_empty());
        assert_eq!(parser.feed(b"f done\r\n\r\ndata: next\n\n"), vec!["half done", "next"]);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut parser = SseParser::default();
        let events = parser.feed(b"data: one\ndata:two\n\n");
        assert_eq!(events, vec!["one\ntwo"]);
    }

    #[test]
    fn comments_and_other_fields_are_ignored() {
        let mut parser = SseParser::default();
        let events = parser.feed(b": keep-alive\nevent: status\nid: 7\nretry: 100\n\ndata: ok\n\n");
        assert_eq!(events, vec!["ok"]);
    }

    #[test]
    fn split_utf8_sequences_survive() {
        let bytes = "data: 完成\n\n".as_bytes();
        let mut parser = SseParser::default();
        assert!(parser.feed(&bytes[..8]).is_empty());
        assert_eq!(parser.feed(&bytes[8..]), vec!["完成"]);
    }

    #[tokio::test]
    async fn unreachable_server_closes_with_reason() {
        let mut stream = StatusStream::open(Client::new(), String::from("http://127.0.0.1:9/status"));
        let event = loop {
            if let Some(event) = stream.poll_event() {
                break event;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        };
        assert!(matches!(event, StreamEvent::Closed(Some(_))));
    }
}
