use log::warn;

use super::connection::Connection;
use super::protocol::ServerMessage;
use crate::session::Session;

/// Reassembles newline-delimited records from raw socket chunks. A record
/// may span two chunks; the incomplete trailing fragment is buffered until
/// the rest arrives.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk and returns the complete records it finished, in
    /// order. Empty records are discarded.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.partial.push_str(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if !line.is_empty() {
                records.push(line.to_string());
            }
        }
        records
    }
}

/// Main-loop half of the receive path: once per tick, drains the inbox,
/// assembles records outside the lock, and applies them to the session in
/// arrival order. Order matters: STATE records are monotonically timestamped
/// and out-of-order application would corrupt interpolation.
#[derive(Debug, Default)]
pub struct Dispatcher {
    assembler: LineAssembler,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump(&mut self, connection: &Connection, session: &mut Session, now: f32) {
        for chunk in connection.drain() {
            self.dispatch_chunk(&chunk, session, now);
        }
    }

    /// A malformed record is logged and skipped; the rest of the batch still
    /// applies. Once the session is terminal the remainder is dropped.
    pub fn dispatch_chunk(&mut self, chunk: &str, session: &mut Session, now: f32) {
        for record in self.assembler.push(chunk) {
            if session.is_terminal() {
                return;
            }
            match ServerMessage::parse(&record) {
                Ok(message) => session.apply(message, now),
                Err(e) => warn!("discarding malformed record {:?}: {}", record, e),
            }
        }
    }
}
