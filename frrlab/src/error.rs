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

//! Module containing all error types

use crate::addressing::PoolKind;
use ipnet::Ipv4Net;
use thiserror::Error;

/// Main error type
///
/// Compiler-stage errors (allocation, missing required node data) are fatal and abort
/// config generation entirely. Delivery-stage errors are isolated per device by the
/// orchestrator.
#[derive(Debug, Error)]
pub enum Error {
    /// More links were classified into a pool than the pool has /30 blocks for. The
    /// topology has outgrown the configured supernet; aborts the whole compile.
    #[error("The {0} address pool is exhausted! The topology has outgrown the supernet.")]
    AllocationExhausted(PoolKind),
    /// The supernet is too small to be split into pools of /30 blocks
    #[error("The supernet {0} cannot be split into two pools of /30 blocks!")]
    InvalidSupernet(Ipv4Net),
    /// A referenced device name has no matching live topology node
    #[error("No node named {0} exists in the project!")]
    UnresolvedNode(String),
    /// A link endpoint references an adapter the node does not have
    #[error("Node {node} has no interface behind adapter {adapter}!")]
    UnknownInterface {
        /// Name of the node
        node: String,
        /// Adapter number referenced by the link
        adapter: u32,
    },
    /// An interface that the peering plan relies on has no assigned address
    #[error("Interface {iface} of {node} has no assigned address!")]
    UnassignedInterface {
        /// Name of the node
        node: String,
        /// Name of the interface
        iface: String,
    },
    /// A core-AS router is missing from the OSPF interface table
    #[error("Router {0} is in the core AS but has no OSPF interface table entry!")]
    MissingOspfInterfaces(String),
    /// A BGP speaker whose name does not encode an AS number
    #[error("Router {0} must speak BGP, but its name encodes no AS number!")]
    MissingAsNumber(String),
    /// The device did not return a prompt in time. Reported per command batch; the
    /// remaining commands of the batch are abandoned.
    #[error("The device did not return a prompt within {seconds} seconds!")]
    DeliveryTimeout {
        /// The configured per-read bound
        seconds: u64,
    },
    /// Error propagated from the GNS3 client
    #[error("GNS3 Error: {0}")]
    Gns3(#[from] gns3::Error),
    /// Cannot parse the settings file
    #[error("Cannot parse the settings file: {0}")]
    Settings(#[from] serde_json::Error),
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}
