//! Splitting an IPv4 network into equally sized subnets.

use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::info;

use crate::error::{MistError, Result};

/// One subnet of a split, with its usable host range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subnet {
    #[serde(rename = "Seq")]
    pub seq: usize,
    #[serde(rename = "Network")]
    pub network: String,
    #[serde(rename = "First Host")]
    pub first_host: Ipv4Addr,
    #[serde(rename = "Last Host")]
    pub last_host: Ipv4Addr,
    #[serde(rename = "Broadcast")]
    pub broadcast: Ipv4Addr,
}

/// Largest number of subnets a single split may produce.
pub const MAX_SUBNETS: u64 = 1 << 16;

fn parse_cidr(network: &str) -> Result<(Ipv4Addr, u8)> {
    let invalid = || MistError::InvalidNetwork(network.to_string());
    let (addr, prefix) = network.trim().split_once('/').ok_or_else(invalid)?;
    let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    if u32::from(addr) & !mask(prefix) != 0 {
        return Err(MistError::InvalidNetwork(format!("{network} has host bits set")));
    }
    Ok((addr, prefix))
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

/// Split `network` (e.g. `10.0.0.0/22`) into `/new_prefix` subnets, in address order.
///
/// For /31 and /32 subnets there is no separate host range; first and last
/// host are the network and broadcast addresses.
pub fn split(network: &str, new_prefix: u8) -> Result<Vec<Subnet>> {
    let (base, prefix) = parse_cidr(network)?;
    if new_prefix < prefix || new_prefix > 32 {
        return Err(MistError::InvalidNetwork(format!(
            "cannot split {network} into /{new_prefix} subnets"
        )));
    }

    let count = 1u64 << (new_prefix - prefix);
    if count > MAX_SUBNETS {
        return Err(MistError::InvalidNetwork(format!(
            "splitting {network} into /{new_prefix} subnets gives {count} subnets, limit is {MAX_SUBNETS}"
        )));
    }

    info!("Creating subnets from {network} as /{new_prefix}s");
    let size = 1u64 << (32 - new_prefix);
    let base = u64::from(u32::from(base));

    let subnets: Vec<Subnet> = (0..count)
        .map(|i| {
            let start = base + i * size;
            let end = start + size - 1;
            let (first, last) = if size > 2 {
                (start + 1, end - 1)
            } else {
                (start, end)
            };
            let addr = |v: u64| Ipv4Addr::from(v as u32);
            Subnet {
                seq: i as usize + 1,
                network: format!("{}/{}", addr(start), new_prefix),
                first_host: addr(first),
                last_host: addr(last),
                broadcast: addr(end),
            }
        })
        .collect();

    info!("Created {} subnets", subnets.len());
    Ok(subnets)
}
