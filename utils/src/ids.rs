//! Record id and opaque token generation.
//!
//! Record ids follow the `<prefix>_<millis>_<suffix>` scheme shared with the
//! browser client: the millisecond component keeps ids roughly sortable, the
//! random base-36 suffix disambiguates ids minted within the same
//! millisecond.

use plenum_types::Timestamp;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh record id with the given kind prefix, e.g.
/// `vote_1717430000123_k3x9a0q2f`.
pub fn fresh_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Timestamp::now().as_millis(),
        base36_suffix()
    )
}

/// Generate an opaque hex token for device pseudo-identities and admin
/// sessions. Not a security boundary — an unguessable handle, nothing more.
pub fn fresh_token() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

fn base36_suffix() -> String {
    let mut n: u64 = rand::random();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_id_has_prefix_and_three_parts() {
        let id = fresh_id("vote");
        assert!(id.starts_with("vote_"));
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let a = fresh_id("control");
        let b = fresh_id("control");
        assert_ne!(a, b);
    }

    #[test]
    fn fresh_token_is_32_hex_chars() {
        let token = fresh_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
