//! Deterministic keys for relationship records.
//!
//! Both directions of a mutual like, and both orderings of a block, must
//! resolve to the same match document. Keys are therefore derived purely
//! from the participant ids, never from event identity.

/// Order a pair lexicographically.
pub fn sorted_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Deterministic, order-independent key for an unordered user pair.
pub fn match_key(a: &str, b: &str) -> String {
    let (first, second) = sorted_pair(a, b);
    format!("{first}_{second}")
}

/// Key of a directed like edge.
pub fn like_key(from: &str, to: &str) -> String {
    format!("{from}_{to}")
}

/// Key of a directed block edge.
pub fn block_key(blocker: &str, subject: &str) -> String {
    format!("{blocker}_{subject}")
}

/// A pair is actionable only when both ids are present and distinct.
/// Self-directed or partial events are dropped upstream as no-ops.
pub fn valid_pair(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a != b
}
