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

//! # Peering plans
//!
//! [`device_plans`] is a pure transform from a topology snapshot, an address
//! assignment and the settings to one [`DevicePlan`] per router. A plan is all
//! the routing intent for one device, independent of any config dialect; the
//! renderer turns it into text afterwards.
//!
//! Core-AS routers run OSPF over the interfaces named in the OSPF table, and the
//! core border routers form an emulated iBGP full mesh: each one peers with every
//! interface address of every other border router listed in the iBGP table, so the
//! sessions survive single-link failures without relying on loopback reachability.
//! eBGP sessions come straight from the cross-boundary links.
//!
//! The designated gateway routers connect the lab to the world: they originate a
//! default route into OSPF, and either peer with the external gateway over BGP or
//! carry a static default route towards it. Never both at once.

use crate::addressing::AddressAssignment;
use crate::roles::NodeClass;
use crate::settings::Settings;
use crate::topology::Topology;
use crate::{Error, Result};

use ipnet::Ipv4Net;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// One BGP neighbor of a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    /// AS number of the neighbor
    pub asn: u32,
    /// Descriptive name (device name, or `device-interface` for mesh sessions)
    pub name: String,
    /// Address the session is established with
    pub ip: Ipv4Addr,
}

/// OSPF intent of one core-AS router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OspfPlan {
    /// Interfaces forming adjacencies, from the OSPF table
    pub interfaces: Vec<String>,
    /// Summarized area range, the point-to-point supernet
    pub supernet: Ipv4Net,
    /// Router ID, derived from the device name
    pub router_id: Ipv4Addr,
    /// True on the gateway routers, which originate the default route
    pub originate_default: bool,
}

/// BGP intent of one border or customer-edge router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpPlan {
    /// Own AS number, from the device name
    pub asn: u32,
    /// Router ID, derived from the device name
    pub router_id: Ipv4Addr,
    /// All sessions, in neighbor-name order
    pub neighbors: Vec<Neighbor>,
    /// Networks advertised explicitly
    pub advertised: Vec<Ipv4Net>,
    /// True outside the core, where connected networks are redistributed instead
    /// of advertising explicit prefixes
    pub redistribute_connected: bool,
    /// Static default next-hop for a gateway router running without gateway BGP
    pub default_route: Option<Ipv4Addr>,
}

/// Complete routing intent for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePlan {
    /// Name of the device
    pub name: String,
    /// Address of every assigned interface
    pub interfaces: BTreeMap<String, Ipv4Net>,
    /// OSPF intent; `None` outside the core AS
    pub ospf: Option<OspfPlan>,
    /// BGP intent; `None` on internal routers
    pub bgp: Option<BgpPlan>,
}

/// Build the plan of every router in the snapshot, in device-name order.
pub fn device_plans(
    topology: &Topology,
    assignment: &AddressAssignment,
    settings: &Settings,
) -> Result<Vec<DevicePlan>> {
    let mut names: Vec<&str> = topology
        .devices
        .iter()
        .filter(|d| d.router)
        .map(|d| d.name.as_str())
        .collect();
    names.sort_unstable();

    names
        .into_iter()
        .map(|name| device_plan(name, topology, assignment, settings))
        .collect()
}

fn device_plan(
    name: &str,
    topology: &Topology,
    assignment: &AddressAssignment,
    settings: &Settings,
) -> Result<DevicePlan> {
    let class = NodeClass::parse(name);
    let core = name.starts_with(&settings.core_tag());

    let interfaces = assignment.interfaces(name).cloned().unwrap_or_default();

    let ospf = if core {
        let table = settings
            .ospf_interfaces
            .get(name)
            .ok_or_else(|| Error::MissingOspfInterfaces(name.to_string()))?;
        Some(OspfPlan {
            interfaces: table.clone(),
            supernet: settings.p2p_supernet,
            router_id: class.router_id(),
            originate_default: settings.is_gateway(name),
        })
    } else {
        None
    };

    let bgp = if class.is_bgp_speaker() {
        Some(bgp_plan(name, &class, core, topology, assignment, settings)?)
    } else {
        None
    };

    Ok(DevicePlan { name: name.to_string(), interfaces, ospf, bgp })
}

fn bgp_plan(
    name: &str,
    class: &NodeClass,
    core: bool,
    topology: &Topology,
    assignment: &AddressAssignment,
    settings: &Settings,
) -> Result<BgpPlan> {
    let asn = class.asn.ok_or_else(|| Error::MissingAsNumber(name.to_string()))?;

    // eBGP sessions from the physical cross-boundary links. Keyed by name so that
    // parallel links collapse to one session and the order is stable.
    let mut sessions: BTreeMap<String, Neighbor> = BTreeMap::new();
    for link in topology.links_of(name) {
        let peer = match link.peer_of(name) {
            Some(peer) if peer.router => peer,
            _ => continue,
        };
        let peer_class = NodeClass::parse(&peer.node);
        if !peer_class.is_bgp_speaker() {
            continue;
        }
        // same-AS sessions never come from the physical link; on the core borders
        // the iBGP table covers every border-facing interface, including the ones
        // that also terminate a direct border-border link
        let peer_asn = match peer_class.asn {
            Some(peer_asn) if peer_asn != asn => peer_asn,
            _ => continue,
        };
        let ip = match assignment.host(&peer.node, &peer.interface) {
            Some(ip) => ip,
            None => continue,
        };
        sessions.insert(
            peer.node.clone(),
            Neighbor { asn: peer_asn, name: peer.node.clone(), ip },
        );
    }

    // the core borders additionally mesh with every iBGP interface of each other
    if core {
        for (peer, ifaces) in settings.ibgp_interfaces.iter().filter(|(peer, _)| *peer != name) {
            for iface in ifaces {
                let ip = assignment.host(peer, iface).ok_or_else(|| Error::UnassignedInterface {
                    node: peer.clone(),
                    iface: iface.clone(),
                })?;
                let session = format!("{}-{}", peer, iface);
                sessions.insert(
                    session.clone(),
                    Neighbor { asn: settings.core_as, name: session, ip },
                );
            }
        }
    }

    let mut advertised = Vec::new();
    let mut redistribute_connected = true;
    if core {
        // the core advertises its summarized supernet instead of redistributing
        advertised.push(settings.p2p_supernet);
        redistribute_connected = false;
    }

    let mut default_route = None;
    if settings.is_gateway(name) {
        if settings.enable_external_gateway_bgp {
            let external =
                settings.external_address_of_node(name).ok_or_else(|| Error::UnassignedInterface {
                    node: name.to_string(),
                    iface: String::from("external"),
                })?;
            sessions.insert(
                String::from("EXTERNAL"),
                Neighbor {
                    asn: settings.external_gateway_as,
                    name: String::from("EXTERNAL"),
                    ip: settings.external_gateway,
                },
            );
            advertised.push(external.address.trunc());
        } else {
            default_route = Some(settings.external_gateway);
        }
    }

    Ok(BgpPlan {
        asn,
        router_id: class.router_id(),
        neighbors: sessions.into_iter().map(|(_, n)| n).collect(),
        advertised,
        redistribute_connected,
        default_route,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::addressing::interface_addresses;
    use crate::topology::{Device, Endpoint, Link};

    fn endpoint(node: &str, interface: &str) -> Endpoint {
        Endpoint { node: node.into(), interface: interface.into(), router: true }
    }

    fn link(id: &str, a: (&str, &str), b: (&str, &str)) -> Link {
        Link { id: id.into(), endpoints: [endpoint(a.0, a.1), endpoint(b.0, b.1)] }
    }

    fn device(name: &str) -> Device {
        Device { name: name.into(), router: true }
    }

    fn lab() -> Topology {
        Topology::new(
            vec![
                device("asn1border1"),
                device("asn1border2"),
                device("asn1border3"),
                device("asn1internal1"),
                device("asn1internal2"),
                device("asn2border1"),
                device("asn6cpe1"),
            ],
            vec![
                link("l1", ("asn1border1", "eth0"), ("asn1internal1", "eth0")),
                link("l2", ("asn1border2", "eth0"), ("asn1internal2", "eth0")),
                link("l3", ("asn1border1", "eth1"), ("asn1border2", "eth1")),
                link("l4", ("asn1border3", "eth6"), ("asn2border1", "eth0")),
                link("l5", ("asn1border3", "eth7"), ("asn6cpe1", "eth0")),
            ],
        )
    }

    fn plans(settings: &Settings) -> Vec<DevicePlan> {
        let topology = lab();
        let assignment = interface_addresses(&topology, settings).unwrap();
        device_plans(&topology, &assignment, settings).unwrap()
    }

    fn plan_of<'a>(plans: &'a [DevicePlan], name: &str) -> &'a DevicePlan {
        plans.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn core_border_meshes_and_peers_with_the_gateway() {
        let settings = Settings::default();
        let all = plans(&settings);
        let plan = plan_of(&all, "asn1border1");

        let ospf = plan.ospf.as_ref().unwrap();
        assert_eq!(ospf.interfaces, vec!["eth0", "eth1"]);
        assert!(ospf.originate_default);
        assert_eq!(ospf.router_id, Ipv4Addr::new(0, 0, 1, 1));

        let bgp = plan.bgp.as_ref().unwrap();
        assert_eq!(bgp.asn, 1);
        // 2 mesh interfaces each of asn1border2 and asn1border3, plus the gateway
        assert_eq!(bgp.neighbors.len(), 5);
        assert!(bgp.neighbors.iter().filter(|n| n.asn == 1).count() == 4);
        let gw = bgp.neighbors.iter().find(|n| n.name == "EXTERNAL").unwrap();
        assert_eq!(gw.asn, 64512);
        assert_eq!(gw.ip, Ipv4Addr::new(192, 168, 1, 254));

        assert!(!bgp.redistribute_connected);
        assert!(bgp.default_route.is_none());
        assert!(bgp.advertised.contains(&"10.0.0.0/24".parse().unwrap()));
        assert!(bgp.advertised.contains(&"192.168.1.0/24".parse().unwrap()));
    }

    #[test]
    fn directly_linked_core_borders_still_peer_through_the_mesh() {
        // asn1border1 and asn1border2 share a physical link (eth1--eth1). The
        // session towards that facing address comes from the mesh table, so
        // skipping the same-AS physical neighbor loses nothing.
        let settings = Settings::default();
        let all = plans(&settings);
        let bgp = plan_of(&all, "asn1border1").bgp.as_ref().unwrap();
        let facing = bgp.neighbors.iter().find(|n| n.name == "asn1border2-eth1").unwrap();
        assert_eq!(facing.asn, 1);
        assert_eq!(facing.ip, Ipv4Addr::new(10, 0, 0, 10));
        // and exactly one session exists towards that address
        assert_eq!(bgp.neighbors.iter().filter(|n| n.ip == facing.ip).count(), 1);
    }

    #[test]
    fn internal_routers_run_ospf_only() {
        let settings = Settings::default();
        let all = plans(&settings);
        let plan = plan_of(&all, "asn1internal1");
        assert!(plan.bgp.is_none());
        let ospf = plan.ospf.as_ref().unwrap();
        assert_eq!(ospf.interfaces, vec!["eth0", "eth6", "eth7"]);
        assert!(!ospf.originate_default);
    }

    #[test]
    fn external_routers_redistribute_connected() {
        let settings = Settings::default();
        let all = plans(&settings);

        let plan = plan_of(&all, "asn2border1");
        assert!(plan.ospf.is_none());
        let bgp = plan.bgp.as_ref().unwrap();
        assert_eq!(bgp.asn, 2);
        assert!(bgp.redistribute_connected);
        assert!(bgp.advertised.is_empty());
        assert_eq!(bgp.neighbors.len(), 1);
        assert_eq!(bgp.neighbors[0].name, "asn1border3");
        assert_eq!(bgp.neighbors[0].asn, 1);
        assert_eq!(bgp.neighbors[0].ip, Ipv4Addr::new(10, 0, 0, 129));

        let cpe = plan_of(&all, "asn6cpe1").bgp.as_ref().unwrap();
        assert_eq!(cpe.asn, 6);
        assert_eq!(cpe.neighbors.len(), 1);
        assert_eq!(cpe.neighbors[0].ip, Ipv4Addr::new(10, 0, 0, 133));
    }

    #[test]
    fn gateway_without_bgp_takes_a_static_default() {
        let mut settings = Settings::default();
        settings.enable_external_gateway_bgp = false;
        let all = plans(&settings);
        let bgp = plan_of(&all, "asn1border1").bgp.as_ref().unwrap();

        assert_eq!(bgp.default_route, Some(Ipv4Addr::new(192, 168, 1, 254)));
        assert!(bgp.neighbors.iter().all(|n| n.name != "EXTERNAL"));
        assert!(!bgp.advertised.contains(&"192.168.1.0/24".parse().unwrap()));
        // still originates the default into the core IGP
        assert!(plan_of(&all, "asn1border1").ospf.as_ref().unwrap().originate_default);
    }

    #[test]
    fn core_router_missing_from_the_ospf_table() {
        let mut settings = Settings::default();
        settings.ospf_interfaces.remove("asn1internal2");
        let topology = lab();
        let assignment = interface_addresses(&topology, &settings).unwrap();
        assert!(matches!(
            device_plans(&topology, &assignment, &settings),
            Err(Error::MissingOspfInterfaces(name)) if name == "asn1internal2"
        ));
    }
}
