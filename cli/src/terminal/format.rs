use std::net::{IpAddr, Ipv6Addr};

use colored::*;
use flock_common::device::DeviceRecord;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    if is_global_unicast(ipv6_addr) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

fn is_global_unicast(ipv6_addr: &Ipv6Addr) -> bool {
    let first_byte = ipv6_addr.octets()[0];
    (0x20..=0x3F).contains(&first_byte)
}

/// Labels an address by family (and IPv6 scope). Addresses the backend reported
/// as free text are shown as-is.
pub fn address_to_detail(address: &str) -> Detail {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(ipv4_addr)) => (
            String::from("IPv4"),
            ipv4_addr.to_string().color(colors::IPV4_ADDR),
        ),
        Ok(IpAddr::V6(ipv6_addr)) => (
            String::from(ipv6_to_type_str(&ipv6_addr)),
            ipv6_addr.to_string().color(colors::IPV6_ADDR),
        ),
        Err(_) => (String::from("Address"), address.color(colors::TEXT_DEFAULT)),
    }
}

pub fn device_to_details(device: &DeviceRecord) -> Vec<Detail> {
    vec![
        address_to_detail(device.address()),
        (String::from("Port"), device.port().color(colors::PORT)),
    ]
}
