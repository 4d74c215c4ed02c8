use std::collections::HashSet;

use crate::record::JobRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    New,
    Seen,
}

/// Identity keys emitted during this process lifetime.
///
/// Grows with every distinct posting and is never pruned; it starts empty on
/// each run.
#[derive(Debug, Default)]
pub struct SeenLedger {
    keys: HashSet<String>,
}

impl SeenLedger {
    pub fn new() -> Self {
        SeenLedger::default()
    }

    /// Classifies `record`, remembering its identity when it is new.
    pub fn classify(&mut self, record: &JobRecord) -> Classification {
        if self.keys.insert(record.identity_key()) {
            Classification::New
        } else {
            Classification::Seen
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
