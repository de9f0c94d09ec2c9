//! JSON Pointers (RFC 6901) into the schema document.
//!
//! Every schema error and every unsupported-construct report carries one of
//! these so users can find the offending node. The empty string addresses the
//! whole document.

/// Appends `segment` to `pointer`, escaping `~` as `~0` and `/` as `~1`.
pub fn push(pointer: &mut String, segment: &str) {
    pointer.push('/');
    for c in segment.chars() {
        match c {
            '~' => pointer.push_str("~0"),
            '/' => pointer.push_str("~1"),
            other => pointer.push(other),
        }
    }
}

/// Returns the pointer to the child `segment` of `pointer`.
#[must_use]
pub fn child(pointer: &str, segment: &str) -> String {
    let mut result: String = pointer.to_string();
    push(&mut result, segment);
    result
}

/// Returns the pointer to a chain of nested children, e.g.
/// `descend("", &["properties", "a/b"])` is `/properties/a~1b`.
#[must_use]
pub fn descend(pointer: &str, segments: &[&str]) -> String {
    let mut result: String = pointer.to_string();
    for segment in segments {
        push(&mut result, segment);
    }
    result
}

/// Returns the pointer to array element `index` of `pointer`.
#[must_use]
pub fn element(pointer: &str, index: usize) -> String {
    format!("{pointer}/{index}")
}
