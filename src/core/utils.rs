use std::net::IpAddr;

use dns_lookup::lookup_addr;

/// PTR name for a public address. Local-only addresses are not looked up,
/// and an answer that merely echoes the address counts as no name.
pub fn reverse_dns(addr: IpAddr) -> Option<String> {
    let local_only = match addr {
        IpAddr::V4(v4) => v4.is_unspecified() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_unspecified() || v6.is_loopback() || v6.is_unicast_link_local(),
    };
    if local_only {
        return None;
    }
    lookup_addr(&addr).ok().filter(|name| *name != addr.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_addresses_are_skipped() {
        for ip in ["127.0.0.1", "0.0.0.0", "169.254.1.1", "::1", "::", "fe80::1"] {
            assert_eq!(reverse_dns(ip.parse().unwrap()), None, "{}", ip);
        }
    }
}
