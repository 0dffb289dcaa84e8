/*!
# Network Specs

A network spec is the unit an account's address space is described with. Two
literal forms are accepted:

- CIDR: `10.0.0.0/24`. Host bits are allowed and truncated (`10.0.0.5/24` is
  `10.0.0.0/24`). A bare address is a single-host network.
- Range: `192.168.1.0-192.168.1.255`, inclusive on both ends.
*/

use crate::errors::{MatcherResult, ParseError};
use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

const RANGE_SEPARATOR: char = '-';
const PREFIX_SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkSpec {
    /// CIDR block, always stored truncated to its network address
    Cidr(IpNet),

    /// Inclusive address range of a single family
    Range { low: IpAddr, high: IpAddr },
}

impl NetworkSpec {
    /// Whether `addr` lies inside this spec.
    ///
    /// Addresses of the other family never match.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match self {
            NetworkSpec::Cidr(net) => net.contains(addr),
            NetworkSpec::Range { low, high } => {
                same_family(low, addr) && low <= addr && addr <= high
            }
        }
    }

    /// First address covered by the spec
    pub fn first(&self) -> IpAddr {
        match self {
            NetworkSpec::Cidr(net) => net.network(),
            NetworkSpec::Range { low, .. } => *low,
        }
    }

    /// Last address covered by the spec
    pub fn last(&self) -> IpAddr {
        match self {
            NetworkSpec::Cidr(net) => net.broadcast(),
            NetworkSpec::Range { high, .. } => *high,
        }
    }
}

impl FromStr for NetworkSpec {
    type Err = ParseError;

    fn from_str(token: &str) -> MatcherResult<Self> {
        let trimmed = token.trim();
        match trimmed.split_once(RANGE_SEPARATOR) {
            Some((low, high)) => parse_range(token, low, high),
            None => parse_cidr(token, trimmed),
        }
    }
}

impl fmt::Display for NetworkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkSpec::Cidr(net) => write!(f, "{}", net),
            NetworkSpec::Range { low, high } => write!(f, "{}{}{}", low, RANGE_SEPARATOR, high),
        }
    }
}

fn parse_range(token: &str, low: &str, high: &str) -> MatcherResult<NetworkSpec> {
    let low = parse_bound(token, low)?;
    let high = parse_bound(token, high)?;

    if !same_family(&low, &high) {
        return Err(ParseError::spec(
            token,
            "range bounds belong to different address families",
        ));
    }

    Ok(NetworkSpec::Range { low, high })
}

fn parse_bound(token: &str, bound: &str) -> MatcherResult<IpAddr> {
    bound
        .trim()
        .parse::<IpAddr>()
        .map_err(|e| ParseError::spec(token, format!("range bound '{}': {}", bound.trim(), e)))
}

fn parse_cidr(token: &str, literal: &str) -> MatcherResult<NetworkSpec> {
    let (addr, prefix_len) = match literal.split_once(PREFIX_SEPARATOR) {
        Some((addr, prefix)) => {
            let addr = parse_host(token, addr)?;
            let prefix_len = prefix
                .trim()
                .parse::<u8>()
                .map_err(|e| ParseError::spec(token, format!("prefix length: {}", e)))?;
            (addr, prefix_len)
        }
        None => {
            let addr = parse_host(token, literal)?;
            (addr, max_prefix_len(&addr))
        }
    };

    let net = IpNet::new(addr, prefix_len).map_err(|e| ParseError::spec(token, e))?;
    Ok(NetworkSpec::Cidr(net.trunc()))
}

fn parse_host(token: &str, addr: &str) -> MatcherResult<IpAddr> {
    addr.trim()
        .parse::<IpAddr>()
        .map_err(|e| ParseError::spec(token, e))
}

fn max_prefix_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn same_family(a: &IpAddr, b: &IpAddr) -> bool {
    a.is_ipv4() == b.is_ipv4()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_cidr_contains_inclusive_bounds() {
        let spec: NetworkSpec = "10.0.0.0/24".parse().unwrap();
        assert!(spec.contains(&ip("10.0.0.0")));
        assert!(spec.contains(&ip("10.0.0.5")));
        assert!(spec.contains(&ip("10.0.0.255")));
        assert!(!spec.contains(&ip("10.0.1.0")));
        assert!(!spec.contains(&ip("9.255.255.255")));
        assert_eq!(spec.first(), ip("10.0.0.0"));
        assert_eq!(spec.last(), ip("10.0.0.255"));
    }

    #[test]
    fn test_cidr_host_bits_are_truncated() {
        let spec: NetworkSpec = "10.0.0.77/24".parse().unwrap();
        assert_eq!(spec.to_string(), "10.0.0.0/24");
        assert!(spec.contains(&ip("10.0.0.1")));
    }

    #[test]
    fn test_bare_address_is_single_host() {
        let spec: NetworkSpec = "172.16.4.9".parse().unwrap();
        assert_eq!(spec.to_string(), "172.16.4.9/32");
        assert!(spec.contains(&ip("172.16.4.9")));
        assert!(!spec.contains(&ip("172.16.4.10")));

        let spec: NetworkSpec = "2001:db8::1".parse().unwrap();
        assert_eq!(spec.to_string(), "2001:db8::1/128");
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let spec: NetworkSpec = "192.168.1.10 - 192.168.1.20".parse().unwrap();
        assert!(spec.contains(&ip("192.168.1.10")));
        assert!(spec.contains(&ip("192.168.1.15")));
        assert!(spec.contains(&ip("192.168.1.20")));
        assert!(!spec.contains(&ip("192.168.1.9")));
        assert!(!spec.contains(&ip("192.168.1.21")));
        assert_eq!(spec.to_string(), "192.168.1.10-192.168.1.20");
    }

    #[test]
    fn test_range_ignores_other_family() {
        let spec: NetworkSpec = "0.0.0.0-255.255.255.255".parse().unwrap();
        assert!(!spec.contains(&ip("::1")));

        let spec: NetworkSpec = "10.0.0.0/8".parse().unwrap();
        assert!(!spec.contains(&ip("::ffff:10.0.0.1")));
    }

    #[test]
    fn test_ipv6_cidr() {
        let spec: NetworkSpec = "2001:db8::/32".parse().unwrap();
        assert!(spec.contains(&ip("2001:db8:ffff::1")));
        assert!(!spec.contains(&ip("2001:db9::1")));
        assert_eq!(spec.last(), ip("2001:db8:ffff:ffff:ffff:ffff:ffff:ffff"));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for token in [
            "not-an-ip",
            "garbage",
            "10.0.0.0/33",
            "10.0.0.0/abc",
            "10.0.0.1-::1",
            "",
        ] {
            let err = token.parse::<NetworkSpec>().unwrap_err();
            assert_eq!(err.token(), token, "token {:?}", token);
        }
    }
}
