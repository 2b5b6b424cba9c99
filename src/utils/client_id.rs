//! Client identifier derivation for rate limiting.
//!
//! Known limitation: when no forwarded address is available we fall back to
//! hashing the user-agent, so every request sharing a user-agent collides.
//! Good enough to stop accidental hammering, not a security boundary.

/// Derive a rate-limit identifier for a request. Prefers the first address
/// in `X-Forwarded-For`; falls back to a hash of the user-agent.
pub fn derive_client_id(forwarded_for: Option<&str>, user_agent: Option<&str>) -> String {
    if let Some(forwarded) = forwarded_for {
        if let Some(addr) = forwarded.split(',').next() {
            let addr = addr.trim();
            if !addr.is_empty() {
                return addr.to_string();
            }
        }
    }
    fingerprint_user_agent(user_agent.unwrap_or("unknown"))
}

/// Reduce a user-agent string to a signed 32-bit hash (`h = h * 31 + byte`,
/// wrapping), rendered as a decimal string.
pub fn fingerprint_user_agent(user_agent: &str) -> String {
    let mut hash: i32 = 0;
    for b in user_agent.bytes() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(b as i32);
    }
    hash.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint_user_agent("abc"), "96354");
        assert_eq!(
            fingerprint_user_agent("Mozilla/5.0"),
            fingerprint_user_agent("Mozilla/5.0")
        );
        assert_ne!(
            fingerprint_user_agent("Mozilla/5.0"),
            fingerprint_user_agent("curl/8.0")
        );
    }

    #[test]
    fn test_forwarded_address_wins() {
        let id = derive_client_id(Some("203.0.113.9, 10.0.0.1"), Some("curl/8.0"));
        assert_eq!(id, "203.0.113.9");
    }

    #[test]
    fn test_empty_forwarded_falls_back_to_agent() {
        let id = derive_client_id(Some("   "), Some("curl/8.0"));
        assert_eq!(id, fingerprint_user_agent("curl/8.0"));
    }

    #[test]
    fn test_no_headers_at_all() {
        assert_eq!(derive_client_id(None, None), fingerprint_user_agent("unknown"));
    }
}
