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

//! # Topology snapshot
//!
//! A read-only snapshot of the project's nodes and links, with link endpoints
//! resolved to (node name, interface name) pairs. Everything downstream of the
//! snapshot is a pure function; the snapshot is recomputed on every invocation
//! and never cached across runs.
//!
//! The devices must be running when the snapshot is taken, otherwise the
//! interface metadata of the nodes is not trustworthy. [`crate::lab::Lab`]
//! enforces this before fetching.

use crate::{Error, Result};

use gns3::{GNS3Node, GNS3Server};

/// True iff the node runs the routing-OS image family
pub fn is_router(node: &GNS3Node) -> bool {
    node.properties
        .as_ref()
        .and_then(|p| p.image.as_ref())
        .map(|image| image.starts_with("frrouting"))
        .unwrap_or(false)
}

/// A device in the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Name of the device
    pub name: String,
    /// True iff the device is a router (see [`is_router`])
    pub router: bool,
}

/// One endpoint of a link, resolved to names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Name of the node
    pub node: String,
    /// Name of the interface the link attaches to
    pub interface: String,
    /// True iff the node is a router
    pub router: bool,
}

/// A point-to-point link between two endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link ID assigned by the topology provider
    pub id: String,
    /// The two endpoints, in provider order
    pub endpoints: [Endpoint; 2],
}

impl Link {
    /// True iff both endpoints belong to the distinguished core AS (both node names
    /// carry the core tag, e.g. `asn1`).
    pub fn is_core_internal(&self, core_tag: &str) -> bool {
        self.endpoints.iter().all(|e| e.node.starts_with(core_tag))
    }

    /// The endpoint on the far side of `node`, if `node` terminates this link
    pub fn peer_of(&self, node: &str) -> Option<&Endpoint> {
        if self.endpoints[0].node == node {
            Some(&self.endpoints[1])
        } else if self.endpoints[1].node == node {
            Some(&self.endpoints[0])
        } else {
            None
        }
    }
}

/// The full snapshot. Read-only during a compilation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// All devices in the project
    pub devices: Vec<Device>,
    /// All links, in canonical order
    pub links: Vec<Link>,
}

impl Topology {
    /// Build a snapshot from raw parts. Links are sorted by their provider ID: the
    /// provider does not guarantee a stable order, but address allocation depends on
    /// it, so a canonical order is pinned here.
    pub fn new(devices: Vec<Device>, mut links: Vec<Link>) -> Self {
        links.sort_by(|a, b| a.id.cmp(&b.id));
        Self { devices, links }
    }

    /// Fetch a snapshot from the server
    pub fn fetch(server: &GNS3Server) -> Result<Self> {
        let nodes = server.get_nodes()?;
        let mut links = Vec::new();
        for link in server.get_links()? {
            let a = resolve_endpoint(&nodes, &link.nodes[0])?;
            let b = resolve_endpoint(&nodes, &link.nodes[1])?;
            links.push(Link { id: link.id, endpoints: [a, b] });
        }
        let devices = nodes
            .iter()
            .map(|n| Device { name: n.name.clone(), router: is_router(n) })
            .collect();
        Ok(Self::new(devices, links))
    }

    /// The device with the given name
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// All links that `node` terminates
    pub fn links_of<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Link> {
        self.links.iter().filter(move |l| l.endpoints.iter().any(|e| e.node == node))
    }
}

fn resolve_endpoint(nodes: &[GNS3Node], ep: &gns3::GNS3LinkEndpoint) -> Result<Endpoint> {
    let node = nodes
        .iter()
        .find(|n| n.id == ep.node_id)
        .ok_or_else(|| Error::UnresolvedNode(ep.node_id.clone()))?;
    let interface = node
        .interface_name(ep.adapter_number)
        .ok_or_else(|| Error::UnknownInterface {
            node: node.name.clone(),
            adapter: ep.adapter_number,
        })?
        .to_string();
    Ok(Endpoint { node: node.name.clone(), interface, router: is_router(node) })
}

#[cfg(test)]
mod test {
    use super::*;

    pub(crate) fn endpoint(node: &str, interface: &str) -> Endpoint {
        Endpoint { node: node.into(), interface: interface.into(), router: true }
    }

    fn link(id: &str, a: (&str, &str), b: (&str, &str)) -> Link {
        Link { id: id.into(), endpoints: [endpoint(a.0, a.1), endpoint(b.0, b.1)] }
    }

    #[test]
    fn canonical_link_order() {
        let links = vec![
            link("c", ("asn1border1", "eth0"), ("asn1border2", "eth0")),
            link("a", ("asn1border1", "eth1"), ("asn1internal1", "eth0")),
            link("b", ("asn2border1", "eth0"), ("asn1border3", "eth6")),
        ];
        let topo = Topology::new(Vec::new(), links);
        let ids: Vec<&str> = topo.links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn core_internal_link() {
        let internal = link("a", ("asn1border1", "eth0"), ("asn1internal1", "eth0"));
        let crossing = link("b", ("asn1border3", "eth6"), ("asn2border1", "eth0"));
        assert!(internal.is_core_internal("asn1"));
        assert!(!crossing.is_core_internal("asn1"));
    }

    #[test]
    fn peer_lookup() {
        let l = link("a", ("asn1border1", "eth0"), ("asn1border2", "eth1"));
        assert_eq!(l.peer_of("asn1border1").unwrap().node, "asn1border2");
        assert_eq!(l.peer_of("asn1border2").unwrap().interface, "eth0");
        assert!(l.peer_of("asn1border3").is_none());
    }
}
