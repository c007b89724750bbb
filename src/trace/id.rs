//! Trace identifier generation.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Builder;

/// Maximum length of any trace identifier, composite ones included.
pub const TRACE_ID_LEN: usize = 32;

/// Opaque correlation token attached to a request.
///
/// Callers must not parse it: a generated id is 32 lowercase hex digits, but
/// composite operation ids and ids read back from storage carry no such guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// First `n` characters of the id.
    pub fn prefix(&self, n: usize) -> &str {
        truncate(&self.0, n)
    }
}

impl From<String> for TraceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TraceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a fresh 32-character trace id from `rng`.
///
/// The layout is that of a random (version 4) UUID without hyphens:
/// position 12 is always `4` and position 16 is one of `8`, `9`, `a`, `b`.
pub fn generate_trace_id<R: RngCore + ?Sized>(rng: &mut R) -> TraceId {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    let uuid = Builder::from_random_bytes(bytes).into_uuid();
    TraceId(uuid.simple().to_string())
}

/// Whether `s` has the shape of a generated id: 32 lowercase hex digits.
pub fn is_generated_trace_id(s: &str) -> bool {
    s.len() == TRACE_ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Longest prefix of `s` holding at most `max_chars` characters.
pub fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn matches_template(id: &str) -> bool {
        id.len() == TRACE_ID_LEN
            && id.chars().enumerate().all(|(i, c)| match i {
                12 => c == '4',
                16 => matches!(c, '8' | '9' | 'a' | 'b'),
                _ => c.is_ascii_digit() || ('a'..='f').contains(&c),
            })
    }

    #[test]
    fn test_generated_ids_follow_template() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let id = generate_trace_id(&mut rng);
            assert!(matches_template(id.as_str()), "bad id {}", id);
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(42);
        let ids: HashSet<_> = (0..2000).map(|_| generate_trace_id(&mut rng)).collect();
        assert_eq!(ids.len(), 2000);
    }

    #[test]
    fn test_same_seed_same_ids() {
        let a = generate_trace_id(&mut StdRng::seed_from_u64(1));
        let b = generate_trace_id(&mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_shape_check() {
        let id = generate_trace_id(&mut StdRng::seed_from_u64(3));
        assert!(is_generated_trace_id(id.as_str()));

        assert!(!is_generated_trace_id(""));
        assert!(!is_generated_trace_id("bad\nid"));
        assert!(!is_generated_trace_id(&id.as_str().to_uppercase()));
        assert!(!is_generated_trace_id(id.prefix(31)));
        assert!(!is_generated_trace_id(&format!("{}0", id)));
    }

    #[test]
    fn test_truncate_short_input() {
        assert_eq!(truncate("abc", 16), "abc");
        assert_eq!(truncate("", 4), "");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("héllo", 2), "hé");
    }
}
