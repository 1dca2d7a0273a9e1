//! Client address resolution.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderMap;

/// Address a connection is attributed to (and banned by).
///
/// With `trust_forwarded` set, `cf-connecting-ip` wins over the first entry
/// of `x-forwarded-for`, which wins over the socket address. IPv4-mapped
/// IPv6 addresses are unmapped, `::1` becomes `127.0.0.1` and an unparsable
/// header value becomes `0.0.0.0`.
pub fn resolve_client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        if let Some(raw) = forwarded_address(headers) {
            return raw
                .parse::<IpAddr>()
                .map(normalize)
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }
    }
    normalize(peer.ip())
}

fn forwarded_address(headers: &HeaderMap) -> Option<&str> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("cf-connecting-ip").or_else(|| {
        header("x-forwarded-for")
            .and_then(|list| list.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    })
}

fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) if v6.is_loopback() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        IpAddr::V4(_) => ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn socket(ip: &str) -> SocketAddr {
        SocketAddr::new(ip.parse().unwrap(), 40000)
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn v4(ip: &str) -> IpAddr {
        ip.parse().unwrap()
    }

    #[test]
    fn test_socket_address_when_headers_are_not_trusted() {
        // テスト項目: プロキシヘッダーを信頼しない場合はソケットのアドレスを使う
        // given (前提条件):
        let headers = headers(&[("x-forwarded-for", "203.0.113.9")]);

        // when (操作):
        let ip = resolve_client_ip(&headers, socket("198.51.100.1"), false);

        // then (期待する結果):
        assert_eq!(ip, v4("198.51.100.1"));
    }

    #[test]
    fn test_cf_connecting_ip_wins() {
        let headers = headers(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "203.0.113.9"),
        ]);

        let ip = resolve_client_ip(&headers, socket("10.0.0.1"), true);

        assert_eq!(ip, v4("203.0.113.7"));
    }

    #[test]
    fn test_first_forwarded_for_entry() {
        // テスト項目: x-forwarded-for のリストは先頭のアドレスを使う
        let headers = headers(&[("x-forwarded-for", " 203.0.113.9 , 10.0.0.2")]);

        let ip = resolve_client_ip(&headers, socket("10.0.0.1"), true);

        assert_eq!(ip, v4("203.0.113.9"));
    }

    #[test]
    fn test_mapped_and_loopback_addresses_are_normalized() {
        // テスト項目: IPv4 射影アドレスと ::1 は IPv4 に正規化される
        let mapped = headers(&[("x-forwarded-for", "::ffff:192.168.1.1")]);

        assert_eq!(
            resolve_client_ip(&mapped, socket("10.0.0.1"), true),
            v4("192.168.1.1")
        );
        assert_eq!(
            resolve_client_ip(&HeaderMap::new(), socket("::1"), true),
            v4("127.0.0.1")
        );
        assert_eq!(
            resolve_client_ip(&HeaderMap::new(), socket("::ffff:10.1.2.3"), false),
            v4("10.1.2.3")
        );
    }

    #[test]
    fn test_unparsable_header_becomes_unspecified() {
        let headers = headers(&[("cf-connecting-ip", "not-an-address")]);

        let ip = resolve_client_ip(&headers, socket("10.0.0.1"), true);

        assert_eq!(ip, v4("0.0.0.0"));
    }

    #[test]
    fn test_missing_headers_fall_back_to_socket() {
        let ip = resolve_client_ip(&HeaderMap::new(), socket("10.0.0.1"), true);

        assert_eq!(ip, v4("10.0.0.1"));
    }
}
