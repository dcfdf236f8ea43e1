// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Program output sink: stdout, or a shared buffer for tests.

use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct Output {
    buffer: Option<Arc<Mutex<String>>>,
}

impl Output {
    pub fn stdout() -> Self {
        Self { buffer: None }
    }

    /// Output collected into a buffer the caller keeps a handle to.
    pub fn captured() -> (Self, Arc<Mutex<String>>) {
        let buffer = Arc::new(Mutex::new(String::new()));
        (Self { buffer: Some(buffer.clone()) }, buffer)
    }

    pub fn write(&self, s: &str) {
        match &self.buffer {
            Some(buf) => {
                if let Ok(mut buf) = buf.lock() {
                    buf.push_str(s);
                }
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(s.as_bytes());
                let _ = stdout.flush();
            }
        }
    }

    pub fn write_line(&self, s: &str) {
        self.write(s);
        self.write("\n");
    }
}
