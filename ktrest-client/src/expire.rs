//! # Expiration Time Handling
//!
//! The server takes `X-Kt-Xt` as an absolute Unix time on requests and
//! reports it back as an HTTP date on GET/HEAD responses.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Converts a relative TTL into the absolute Unix time sent as `X-Kt-Xt`.
///
/// Partial seconds round up, so a sub-second TTL never lands on `now`.
pub fn absolute_xt(ttl: Duration) -> i64 {
    absolute_xt_from(Utc::now(), ttl)
}

fn absolute_xt_from(now: DateTime<Utc>, ttl: Duration) -> i64 {
    let whole = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    let secs = i64::try_from(whole).unwrap_or(i64::MAX);
    now.timestamp().saturating_add(secs)
}

/// Parses an `X-Kt-Xt` response header.
///
/// Accepts the RFC 1123 date the server emits, or plain Unix seconds.
/// Returns `None` for anything else.
pub fn parse_xt_header(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_ttl_to_now() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(absolute_xt_from(now, Duration::from_secs(60)), 1_700_000_060);
        assert_eq!(absolute_xt_from(now, Duration::ZERO), 1_700_000_000);
    }

    #[test]
    fn rounds_partial_seconds_up() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(absolute_xt_from(now, Duration::from_millis(500)), 1_700_000_001);
        assert_eq!(absolute_xt_from(now, Duration::from_millis(60_001)), 1_700_000_061);
        assert_eq!(absolute_xt_from(now, Duration::from_nanos(1)), 1_700_000_001);
    }

    #[test]
    fn saturates_huge_ttl() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(absolute_xt_from(now, Duration::from_secs(u64::MAX)), i64::MAX);
    }

    #[test]
    fn absolute_xt_is_in_the_future() {
        let before = Utc::now().timestamp();
        let xt = absolute_xt(Duration::from_secs(30));
        assert!(xt >= before + 30);
        assert!(xt <= Utc::now().timestamp() + 30);
    }

    #[test]
    fn parses_http_date() {
        let date = parse_xt_header("Tue, 14 Nov 2023 22:13:20 GMT").unwrap();
        assert_eq!(date.timestamp(), 1_700_000_000);
    }

    #[test]
    fn parses_unix_seconds() {
        let date = parse_xt_header(" 1700000000 ").unwrap();
        assert_eq!(date.timestamp(), 1_700_000_000);
    }

    #[test]
    fn ignores_garbage() {
        assert_eq!(parse_xt_header("soon"), None);
        assert_eq!(parse_xt_header(""), None);
    }
}
