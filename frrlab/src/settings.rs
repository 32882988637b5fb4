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

//! # Settings
//!
//! Operator-supplied parameters, read from a JSON file. Every field has a default
//! matching the lab this tool ships for, so a missing file or a partial file works.

use crate::{Error, Result};

use ipnet::Ipv4Net;
use maplit::btreemap;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// All operator-supplied parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Host the GNS3 server (and the device consoles) listen on
    pub gns3_host: String,
    /// Port of the GNS3 server REST API
    pub gns3_port: u16,
    /// Name of the GNS3 project holding the lab
    pub project_name: String,
    /// A free supernet, at least a /24, from which all point-to-point addressing is carved
    pub p2p_supernet: Ipv4Net,
    /// Number of the distinguished core AS
    pub core_as: u32,
    /// Static addresses for externally-facing interfaces. These are recorded verbatim and
    /// never drawn from an address pool.
    pub external_addresses: Vec<ExternalAddress>,
    /// Which interfaces of each core-AS router should form OSPF adjacencies
    pub ospf_interfaces: BTreeMap<String, Vec<String>>,
    /// Which interfaces of each core-AS border router take part in the emulated iBGP full mesh
    pub ibgp_interfaces: BTreeMap<String, Vec<String>>,
    /// Core-AS border routers that reach the external gateway. These originate a default
    /// route into OSPF, and either peer with the gateway via BGP or point a static default
    /// route at it, depending on `enable_external_gateway_bgp`.
    pub gateway_nodes: Vec<String>,
    /// IP of the (real, outside the lab) gateway on the same subnet as the external addresses
    pub external_gateway: Ipv4Addr,
    /// If true, the gateway nodes peer with `external_gateway` via BGP and advertise their
    /// external subnet. If false, they get a static default route instead. Never both.
    pub enable_external_gateway_bgp: bool,
    /// AS number of the external gateway, used when `enable_external_gateway_bgp` is set
    pub external_gateway_as: u32,
    /// Directory the generated config files are written to
    pub output_dir: PathBuf,
    /// Extension of the generated config files
    pub config_extension: String,
}

/// An operator-supplied static address for one specific interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalAddress {
    /// Name of the node
    pub node: String,
    /// Name of the interface
    pub interface: String,
    /// Address with prefix length, in CIDR form
    pub address: Ipv4Net,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gns3_host: String::from("localhost"),
            gns3_port: 3080,
            project_name: String::from("frr-bgp"),
            p2p_supernet: "10.0.0.0/24".parse().unwrap(),
            core_as: 1,
            external_addresses: vec![
                ExternalAddress {
                    node: String::from("asn1border1"),
                    interface: String::from("eth7"),
                    address: "192.168.1.251/24".parse().unwrap(),
                },
                ExternalAddress {
                    node: String::from("asn1border2"),
                    interface: String::from("eth7"),
                    address: "192.168.1.252/24".parse().unwrap(),
                },
            ],
            ospf_interfaces: btreemap! {
                String::from("asn1border1") => svec(&["eth0", "eth1"]),
                String::from("asn1border2") => svec(&["eth0", "eth1"]),
                String::from("asn1border3") => svec(&["eth6", "eth7"]),
                String::from("asn1internal1") => svec(&["eth0", "eth6", "eth7"]),
                String::from("asn1internal2") => svec(&["eth0", "eth6", "eth7"]),
            },
            ibgp_interfaces: btreemap! {
                String::from("asn1border1") => svec(&["eth0", "eth1"]),
                String::from("asn1border2") => svec(&["eth0", "eth1"]),
                String::from("asn1border3") => svec(&["eth6", "eth7"]),
            },
            gateway_nodes: svec(&["asn1border1", "asn1border2"]),
            external_gateway: Ipv4Addr::new(192, 168, 1, 254),
            enable_external_gateway_bgp: true,
            external_gateway_as: 64512,
            output_dir: PathBuf::from("generated"),
            config_extension: String::from("ios"),
        }
    }
}

impl Settings {
    /// Read the settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path).map_err(Error::Io)?)?)
    }

    /// Name prefix shared by every device of the core AS (e.g. `asn1`)
    pub fn core_tag(&self) -> String {
        format!("asn{}", self.core_as)
    }

    /// The operator-supplied address for the given interface, if one is configured
    pub fn external_address(&self, node: &str, interface: &str) -> Option<Ipv4Net> {
        self.external_addresses
            .iter()
            .find(|e| e.node == node && e.interface == interface)
            .map(|e| e.address)
    }

    /// The operator-supplied address entry for any interface of the given node
    pub fn external_address_of_node(&self, node: &str) -> Option<&ExternalAddress> {
        self.external_addresses.iter().find(|e| e.node == node)
    }

    /// True if the node is one of the designated external gateway routers
    pub fn is_gateway(&self, node: &str) -> bool {
        self.gateway_nodes.iter().any(|n| n == node)
    }
}

fn svec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.core_tag(), "asn1");
        assert_eq!(s.p2p_supernet.prefix_len(), 24);
        assert_eq!(s.ospf_interfaces.len(), 5);
        assert_eq!(s.ibgp_interfaces.len(), 3);
        assert!(s.is_gateway("asn1border1"));
        assert!(s.is_gateway("asn1border2"));
        assert!(!s.is_gateway("asn1border3"));
    }

    #[test]
    fn external_address_lookup() {
        let s = Settings::default();
        assert_eq!(
            s.external_address("asn1border1", "eth7"),
            Some("192.168.1.251/24".parse().unwrap())
        );
        assert_eq!(s.external_address("asn1border1", "eth0"), None);
        assert_eq!(s.external_address("asn1internal1", "eth7"), None);
    }

    #[test]
    fn json_round_trip() {
        let s = Settings::default();
        let text = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&text).unwrap(), s);
    }

    #[test]
    fn partial_file_takes_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{ "project_name": "other-lab", "core_as": 2 }"#).unwrap();
        assert_eq!(s.project_name, "other-lab");
        assert_eq!(s.core_tag(), "asn2");
        assert_eq!(s.gns3_port, 3080);
        assert_eq!(s.output_dir, PathBuf::from("generated"));
    }
}
