//! Focus/blur change detection for editable fields.
//!
//! A snapshot is taken when a field gains focus and compared when it loses
//! focus, so one sync is sent per edit session instead of per keystroke.

/// Result of a blur comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Trimmed values match; nothing to sync.
    Unchanged,
    /// Value differs; carries the raw blur-time value.
    Changed(String),
}

/// Holds the focus-time value of the currently focused field.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    snapshot: String,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the field value at focus time, replacing any earlier snapshot.
    pub fn focus(&mut self, value: &str) {
        self.snapshot.clear();
        self.snapshot.push_str(value);
    }

    /// Compares the blur-time value against the snapshot.
    ///
    /// Leading/trailing whitespace is ignored; interior differences count.
    pub fn blur(&self, value: &str) -> FieldChange {
        if value.trim() == self.snapshot.trim() {
            FieldChange::Unchanged
        } else {
            FieldChange::Changed(value.to_string())
        }
    }
}
