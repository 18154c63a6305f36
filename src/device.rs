//! Device fingerprint derivation
//!
//! A fingerprint is the raw concatenation `user_agent|source_address` with no
//! normalization. Differing user-agent casing or proxy-rewritten addresses
//! produce different fingerprints; that imprecision is accepted, and the
//! fingerprint only has to be stable enough to scope revocation to a device.

use actix_web::http::header;
use actix_web::HttpRequest;

/// Fallback for a missing user agent or unresolvable peer address.
const UNKNOWN: &str = "unknown";

/// Derive a device fingerprint from its two components.
#[must_use]
pub fn fingerprint(user_agent: &str, source_address: &str) -> String {
    format!("{user_agent}|{source_address}")
}

/// Derive the fingerprint of the client behind an inbound request.
#[must_use]
pub fn fingerprint_from_request(req: &HttpRequest) -> String {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(UNKNOWN);

    let connection_info = req.connection_info();
    let source_address = connection_info.realip_remote_addr().unwrap_or(UNKNOWN);

    fingerprint(user_agent, source_address)
}

/// Split a stored fingerprint back into `(device_info, ip)`.
///
/// Splits on the rightmost separator since an address cannot contain `|`
/// while a user agent in principle could. A fingerprint without a separator
/// yields an empty ip component.
#[must_use]
pub fn split_fingerprint(fingerprint: &str) -> (&str, &str) {
    fingerprint.rsplit_once('|').unwrap_or((fingerprint, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_fingerprint_concatenation() {
        assert_eq!(fingerprint("UA1", "1.2.3.4"), "UA1|1.2.3.4");
    }

    #[test]
    fn test_split_roundtrip() {
        let fp = fingerprint("Mozilla/5.0 (X11; Linux x86_64)", "10.0.0.7");
        assert_eq!(
            split_fingerprint(&fp),
            ("Mozilla/5.0 (X11; Linux x86_64)", "10.0.0.7")
        );
    }

    #[test]
    fn test_split_prefers_rightmost_separator() {
        assert_eq!(split_fingerprint("odd|agent|5.6.7.8"), ("odd|agent", "5.6.7.8"));
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split_fingerprint("bare"), ("bare", ""));
    }

    #[test]
    fn test_fingerprint_from_request() {
        let req = TestRequest::default()
            .insert_header((header::USER_AGENT, "UA1"))
            .peer_addr("1.2.3.4:9999".parse().unwrap())
            .to_http_request();
        assert_eq!(fingerprint_from_request(&req), "UA1|1.2.3.4");
    }

    #[test]
    fn test_fingerprint_from_bare_request() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(fingerprint_from_request(&req), "unknown|unknown");
    }
}
