//! Scripted serial port for protocol tests
//!
//! Reads hand out one scripted reply line per call (CRLF appended) and time
//! out once the script runs dry. Writes are recorded so tests can count
//! transmissions after the link has been handed to the code under test.

#![allow(dead_code)]

use gcodesend_communication::{Channel, LineLink};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Option<String>>,
    written: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct ScriptedPort {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedPort {
    pub fn new(replies: &[&str]) -> Self {
        let port = Self::default();
        for reply in replies {
            port.push_reply(reply);
        }
        port
    }

    pub fn push_reply(&self, reply: &str) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Some(reply.to_string()));
    }

    /// Queue a read that times out before the next scripted reply
    pub fn push_timeout(&self) {
        self.state.lock().unwrap().replies.push_back(None);
    }

    pub fn remaining_replies(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().unwrap().written).into_owned()
    }

    /// Every CRLF-terminated line written so far, wake-up lines included
    pub fn sent_lines(&self) -> Vec<String> {
        let written = self.written();
        let mut lines: Vec<String> = written.split("\r\n").map(str::to_string).collect();
        // split leaves an empty tail after the final terminator
        lines.pop();
        lines
    }

    /// Written lines that carry a command
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent_lines()
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Live handles on the script, this one included
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.state)
    }

    pub fn link(&self) -> LineLink<ScriptedPort> {
        LineLink::new(self.clone(), "scripted", Duration::from_millis(100))
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        match state.replies.pop_front() {
            Some(Some(reply)) => {
                let frame = format!("{}\r\n", reply);
                let bytes = frame.as_bytes();
                assert!(bytes.len() <= buf.len(), "scripted reply too long");
                buf[..bytes.len()].copy_from_slice(bytes);
                Ok(bytes.len())
            }
            Some(None) | None => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
        }
    }
}

impl Channel for ScriptedPort {
    fn set_read_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.lock().unwrap().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
