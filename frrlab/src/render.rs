// FrrLab: Automated Addressing and Routing Configuration for GNS3 Labs
// Copyright (C) 2024  FrrLab Contributors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Config rendering
//!
//! [`ConfigRenderer`] is the dialect boundary: it turns the dialect-independent
//! [`DevicePlan`] into configuration text, one command per line, ready to be
//! pasted into a device's configuration shell. [`FrrRenderer`] emits the FRR
//! `vtysh` dialect. Rendering is pure; it touches neither the filesystem nor
//! the network.

use crate::peering::{BgpPlan, DevicePlan, OspfPlan};

use ipnet::Ipv4Net;

use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders the sections of a device configuration in some dialect.
pub trait ConfigRenderer {
    /// Interface addressing
    fn base(&self, interfaces: &BTreeMap<String, Ipv4Net>) -> String;
    /// The IGP section
    fn ospf(&self, plan: &OspfPlan) -> String;
    /// The BGP section
    fn bgp(&self, plan: &BgpPlan) -> String;
}

/// Render the full configuration of one device: interface addressing first,
/// then the IGP, then BGP. Sections a plan does not have are omitted.
pub fn render_device(renderer: &dyn ConfigRenderer, plan: &DevicePlan) -> String {
    let mut sections = vec![renderer.base(&plan.interfaces)];
    if let Some(ospf) = &plan.ospf {
        sections.push(renderer.ospf(ospf));
    }
    if let Some(bgp) = &plan.bgp {
        sections.push(renderer.bgp(bgp));
    }
    sections.retain(|s| !s.is_empty());
    sections.join("\n")
}

/// The FRR `vtysh` dialect
#[derive(Debug, Default, Clone, Copy)]
pub struct FrrRenderer;

impl ConfigRenderer for FrrRenderer {
    fn base(&self, interfaces: &BTreeMap<String, Ipv4Net>) -> String {
        let mut out = String::new();
        for (iface, addr) in interfaces {
            writeln!(out, "interface {}", iface).unwrap();
            writeln!(out, " ip address {}", addr).unwrap();
            writeln!(out, "exit").unwrap();
        }
        out
    }

    fn ospf(&self, plan: &OspfPlan) -> String {
        let mut out = String::new();
        writeln!(out, "router ospf").unwrap();
        writeln!(out, " ospf router-id {}", plan.router_id).unwrap();
        writeln!(out, " area 0 range {}", plan.supernet).unwrap();
        if plan.originate_default {
            writeln!(out, " default-information originate").unwrap();
        }
        writeln!(out, "exit").unwrap();
        for iface in &plan.interfaces {
            writeln!(out, "interface {}", iface).unwrap();
            writeln!(out, " ip ospf area 0").unwrap();
            writeln!(out, "exit").unwrap();
        }
        out
    }

    fn bgp(&self, plan: &BgpPlan) -> String {
        let mut out = String::new();
        writeln!(out, "router bgp {}", plan.asn).unwrap();
        writeln!(out, " bgp router-id {}", plan.router_id).unwrap();
        for neighbor in &plan.neighbors {
            writeln!(out, " neighbor {} remote-as {}", neighbor.ip, neighbor.asn).unwrap();
            writeln!(out, " neighbor {} description {}", neighbor.ip, neighbor.name).unwrap();
        }
        writeln!(out, " address-family ipv4 unicast").unwrap();
        for network in &plan.advertised {
            writeln!(out, "  network {}", network).unwrap();
        }
        if plan.redistribute_connected {
            writeln!(out, "  redistribute connected").unwrap();
        }
        writeln!(out, " exit-address-family").unwrap();
        writeln!(out, "exit").unwrap();
        if let Some(next_hop) = plan.default_route {
            writeln!(out, "ip route 0.0.0.0/0 {}", next_hop).unwrap();
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::peering::Neighbor;
    use maplit::btreemap;
    use std::net::Ipv4Addr;

    fn interfaces() -> BTreeMap<String, Ipv4Net> {
        btreemap! {
            String::from("eth0") => "10.0.0.1/30".parse().unwrap(),
            String::from("eth7") => "192.168.1.251/24".parse().unwrap(),
        }
    }

    #[test]
    fn base_section() {
        let text = FrrRenderer.base(&interfaces());
        assert_eq!(
            text,
            "interface eth0\n ip address 10.0.0.1/30\nexit\n\
             interface eth7\n ip address 192.168.1.251/24\nexit\n"
        );
    }

    #[test]
    fn ospf_section() {
        let plan = OspfPlan {
            interfaces: vec![String::from("eth0"), String::from("eth1")],
            supernet: "10.0.0.0/24".parse().unwrap(),
            router_id: Ipv4Addr::new(0, 0, 1, 1),
            originate_default: true,
        };
        let text = FrrRenderer.ospf(&plan);
        assert!(text.starts_with("router ospf\n ospf router-id 0.0.1.1\n"));
        assert!(text.contains(" area 0 range 10.0.0.0/24\n"));
        assert!(text.contains(" default-information originate\n"));
        assert!(text.contains("interface eth1\n ip ospf area 0\nexit\n"));

        let mut silent = plan;
        silent.originate_default = false;
        assert!(!FrrRenderer.ospf(&silent).contains("default-information"));
    }

    #[test]
    fn bgp_section() {
        let plan = BgpPlan {
            asn: 2,
            router_id: Ipv4Addr::new(0, 0, 2, 1),
            neighbors: vec![Neighbor {
                asn: 1,
                name: String::from("asn1border3"),
                ip: Ipv4Addr::new(10, 0, 0, 129),
            }],
            advertised: Vec::new(),
            redistribute_connected: true,
            default_route: None,
        };
        let text = FrrRenderer.bgp(&plan);
        assert!(text.starts_with("router bgp 2\n bgp router-id 0.0.2.1\n"));
        assert!(text.contains(" neighbor 10.0.0.129 remote-as 1\n"));
        assert!(text.contains(" neighbor 10.0.0.129 description asn1border3\n"));
        assert!(text.contains(" address-family ipv4 unicast\n  redistribute connected\n"));
        assert!(!text.contains("ip route"));
    }

    #[test]
    fn static_default_route() {
        let plan = BgpPlan {
            asn: 1,
            router_id: Ipv4Addr::new(0, 0, 1, 1),
            neighbors: Vec::new(),
            advertised: vec!["10.0.0.0/24".parse().unwrap()],
            redistribute_connected: false,
            default_route: Some(Ipv4Addr::new(192, 168, 1, 254)),
        };
        let text = FrrRenderer.bgp(&plan);
        assert!(text.contains("  network 10.0.0.0/24\n"));
        assert!(!text.contains("redistribute connected"));
        assert!(text.ends_with("ip route 0.0.0.0/0 192.168.1.254\n"));
    }

    #[test]
    fn full_device() {
        let plan = DevicePlan {
            name: String::from("asn1internal1"),
            interfaces: interfaces(),
            ospf: Some(OspfPlan {
                interfaces: vec![String::from("eth0")],
                supernet: "10.0.0.0/24".parse().unwrap(),
                router_id: Ipv4Addr::new(0, 1, 1, 1),
                originate_default: false,
            }),
            bgp: None,
        };
        let text = render_device(&FrrRenderer, &plan);
        assert!(text.contains("ip address 10.0.0.1/30"));
        assert!(text.contains("router ospf"));
        assert!(!text.contains("router bgp"));
    }
}
