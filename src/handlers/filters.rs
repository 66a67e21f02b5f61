//! Ready-made request filters.
//!
//! # Design Decisions
//! - Station/access-point filters compare the local interface the request
//!   arrived on with the station address; with no station address known
//!   (no Wi-Fi) both reject
//! - Subnet filter checks the client address; IPv4 and IPv6 never mix

use std::net::IpAddr;
use std::sync::Arc;

use crate::handlers::RequestFilter;
use crate::http::Request;

/// Accept only requests that arrived on the station interface.
pub fn on_station(station_ip: Option<IpAddr>) -> RequestFilter {
    Arc::new(move |req: &Request| match station_ip {
        Some(ip) => req.local_ip() == Some(ip),
        None => false,
    })
}

/// Accept only requests that arrived on the access-point interface.
pub fn on_access_point(station_ip: Option<IpAddr>) -> RequestFilter {
    Arc::new(move |req: &Request| match station_ip {
        Some(ip) => req.local_ip() != Some(ip),
        None => false,
    })
}

/// Accept only clients inside `network/prefix_len`.
pub fn from_subnet(network: IpAddr, prefix_len: u8) -> RequestFilter {
    Arc::new(move |req: &Request| {
        req.remote_ip()
            .map(|ip| in_subnet(ip, network, prefix_len))
            .unwrap_or(false)
    })
}

fn in_subnet(ip: IpAddr, network: IpAddr, prefix_len: u8) -> bool {
    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            let bits = u32::from(prefix_len.min(32));
            let mask = u32::MAX.checked_shl(32 - bits).unwrap_or(0);
            u32::from(ip) & mask == u32::from(net) & mask
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            let bits = u32::from(prefix_len.min(128));
            let mask = u128::MAX.checked_shl(128 - bits).unwrap_or(0);
            u128::from(ip) & mask == u128::from(net) & mask
        }
        _ => false,
    }
}
