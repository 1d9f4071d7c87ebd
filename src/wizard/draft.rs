//! The accumulating, unsubmitted registration record

use serde_json::Value;
use ulid::Ulid;

/// Per-step slices captured so far
///
/// A slot is filled only after its step validated at least once. The id is
/// fresh for every draft and only used to correlate log lines.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardDraft {
    id: Ulid,
    slices: Vec<Option<Value>>,
}

impl WizardDraft {
    pub fn new(step_count: usize) -> Self {
        Self {
            id: Ulid::new(),
            slices: vec![None; step_count],
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Slice stored for a 1-based step position
    pub fn get(&self, index: usize) -> Option<&Value> {
        index
            .checked_sub(1)
            .and_then(|i| self.slices.get(i))
            .and_then(|s| s.as_ref())
    }

    /// Store a slice, returning false if the position is out of range
    pub(crate) fn set(&mut self, index: usize, slice: Value) -> bool {
        match index.checked_sub(1).and_then(|i| self.slices.get_mut(i)) {
            Some(slot) => {
                *slot = Some(slice);
                true
            }
            None => false,
        }
    }

    pub fn filled(&self) -> usize {
        self.slices.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }

    /// Look up a top-level field across all slices, first match wins
    pub fn find_field(&self, name: &str) -> Option<&Value> {
        self.slices
            .iter()
            .flatten()
            .find_map(|slice| slice.get(name))
    }
}
