// Request id generation
//
// Ids only need to be unique per client; the daemon echoes them back and the
// correlator compares them.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

pub trait RequestIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUID tokens (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl RequestIdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// `prefix` followed by a counter starting at 1
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("")
    }
}

impl RequestIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", self.prefix, n)
    }
}
