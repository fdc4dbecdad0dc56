//! Push keys: chronologically sortable child keys.
//!
//! A key is 8 characters of millisecond timestamp followed by 12 characters
//! of a per-database sequence, both in an alphabet whose ASCII order matches
//! digit order. Keys generated later always sort after earlier ones.

use std::time::{SystemTime, UNIX_EPOCH};

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_time: u64,
    sequence: u64,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.next_id_at(now)
    }

    /// Key for `now_ms`; a clock that goes backwards is treated as unchanged.
    pub fn next_id_at(&mut self, now_ms: u64) -> String {
        if now_ms > self.last_time {
            self.last_time = now_ms;
            self.sequence = 0;
        } else {
            self.sequence += 1;
        }
        let mut id = encode(self.last_time, 8);
        id.push_str(&encode(self.sequence, 12));
        id
    }
}

fn encode(mut n: u64, width: usize) -> String {
    let mut out = vec![b'-'; width];
    for slot in out.iter_mut().rev() {
        *slot = PUSH_CHARS[(n % 64) as usize];
        n /= 64;
    }
    String::from_utf8_lossy(&out).into_owned()
}
