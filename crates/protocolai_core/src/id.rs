//! Short identifier generation for documents, blocks and toasts.
//!
//! # Invariants
//! - Generated ids are lowercase hex and never empty.
//! - Document ids always carry the `doc_` prefix.

use uuid::Uuid;

const SHORT_ID_LEN: usize = 12;
const DOCUMENT_ID_PREFIX: &str = "doc_";

/// Returns a short random identifier.
pub fn short_id() -> String {
    let mut value = Uuid::new_v4().simple().to_string();
    value.truncate(SHORT_ID_LEN);
    value
}

/// Returns a fresh document identifier (`doc_<short id>`).
pub fn document_id() -> String {
    format!("{DOCUMENT_ID_PREFIX}{}", short_id())
}

#[cfg(test)]
mod tests {
    use super::{document_id, short_id, SHORT_ID_LEN};
    use std::collections::HashSet;

    #[test]
    fn short_ids_are_fixed_length_hex() {
        let id = short_id();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn document_ids_are_prefixed_and_distinct() {
        let ids: HashSet<String> = (0..200).map(|_| document_id()).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.starts_with("doc_")));
    }
}
