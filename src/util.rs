use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

const DEFAULT_PORT: u16 = 8000;

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 0);

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

pub fn default_bind_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(DEFAULT_ADDR), DEFAULT_PORT)
}

/// Read `key` from the environment, falling back to `default` if it is unset
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse `key` from the environment, falling back to `default` if it
/// is unset or does not parse
pub fn env_parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(res) => parse_or(&res, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(value: &str, default: T) -> T {
    value.trim().parse().unwrap_or(default)
}
