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

//! # Point-to-point addressing
//!
//! ## IP Convention
//!
//! The supernet is split in half: the first half is the pool for core-internal
//! links, the second half the pool for cross-boundary links. Each pool is carved
//! into /30 blocks, and every link consumes the next block of its pool, in
//! canonical link order. Both router endpoints of a link then get the block's
//! host addresses in endpoint order, so with supernet `10.0.0.0/24` the first
//! core-internal link becomes `10.0.0.1/30` and `10.0.0.2/30`, the second
//! `10.0.0.5/30` and `10.0.0.6/30`, and the first cross-boundary link becomes
//! `10.0.0.129/30` and `10.0.0.130/30`.
//!
//! Interfaces with an operator-supplied external address keep that address
//! verbatim and draw nothing from any pool. A link whose endpoints are not both
//! routers still consumes its block, so the block-to-link correspondence never
//! shifts.
//!
//! Allocation is deterministic: the same snapshot always yields the same
//! assignment. Running out of blocks is a hard [`Error::AllocationExhausted`]
//! stop, never a wraparound.

use crate::settings::Settings;
use crate::topology::Topology;
use crate::{Error, Result};

use ipnet::Ipv4Net;

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// Prefix length of the per-link blocks
pub const BLOCK_PREFIX: u8 = 30;

/// The two allocation pools, by link classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// Links with both endpoints in the core AS
    CoreInternal,
    /// Links crossing an AS boundary
    CrossBoundary,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::CoreInternal => write!(f, "core-internal"),
            PoolKind::CrossBoundary => write!(f, "cross-boundary"),
        }
    }
}

/// Split the supernet into the two pool halves: (core-internal, cross-boundary).
/// Restartable; the same supernet always yields the same halves.
pub fn pools(supernet: Ipv4Net) -> Result<(Ipv4Net, Ipv4Net)> {
    let mut halves = supernet
        .subnets(supernet.prefix_len() + 1)
        .map_err(|_| Error::InvalidSupernet(supernet))?;
    let core = halves.next().ok_or(Error::InvalidSupernet(supernet))?;
    let cross = halves.next().ok_or(Error::InvalidSupernet(supernet))?;
    Ok((core, cross))
}

/// The /30 blocks of one pool, lazily, in order, covering the pool exactly.
pub fn blocks(pool: Ipv4Net) -> Result<impl Iterator<Item = Ipv4Net>> {
    pool.subnets(BLOCK_PREFIX).map_err(|_| Error::InvalidSupernet(pool))
}

/// The per-interface address map of the whole lab: (node name, interface name)
/// to an address in CIDR form. Built exactly once per compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressAssignment {
    map: BTreeMap<String, BTreeMap<String, Ipv4Net>>,
}

impl AddressAssignment {
    /// The address assigned to an interface, with prefix length
    pub fn get(&self, node: &str, interface: &str) -> Option<Ipv4Net> {
        self.map.get(node).and_then(|ifaces| ifaces.get(interface)).copied()
    }

    /// The address assigned to an interface, without the prefix length
    pub fn host(&self, node: &str, interface: &str) -> Option<Ipv4Addr> {
        self.get(node, interface).map(|net| net.addr())
    }

    /// All assigned interfaces of a node, in interface-name order
    pub fn interfaces(&self, node: &str) -> Option<&BTreeMap<String, Ipv4Net>> {
        self.map.get(node)
    }

    /// Number of assigned interfaces over all nodes
    pub fn len(&self) -> usize {
        self.map.values().map(|ifaces| ifaces.len()).sum()
    }

    /// True if no interface has an address
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn insert(&mut self, node: &str, interface: &str, addr: Ipv4Net) {
        self.map.entry(node.to_string()).or_default().insert(interface.to_string(), addr);
    }
}

/// Walk all links once and assign every router interface its address.
///
/// The devices must be running when the snapshot was taken (the orchestrator
/// enforces this); the snapshot's canonical link order decides which block each
/// link gets.
pub fn interface_addresses(
    topology: &Topology,
    settings: &Settings,
) -> Result<AddressAssignment> {
    let core_tag = settings.core_tag();
    let (core_pool, cross_pool) = pools(settings.p2p_supernet)?;
    let mut core_blocks = blocks(core_pool)?;
    let mut cross_blocks = blocks(cross_pool)?;

    let mut assignment = AddressAssignment::default();
    for link in &topology.links {
        let (block, pool) = if link.is_core_internal(&core_tag) {
            (core_blocks.next(), PoolKind::CoreInternal)
        } else {
            (cross_blocks.next(), PoolKind::CrossBoundary)
        };
        let block = block.ok_or(Error::AllocationExhausted(pool))?;

        let mut hosts = block.hosts();
        for endpoint in link.endpoints.iter() {
            if !endpoint.router {
                continue;
            }
            if let Some(addr) = settings.external_address(&endpoint.node, &endpoint.interface) {
                assignment.insert(&endpoint.node, &endpoint.interface, addr);
                continue;
            }
            let host = hosts.next().ok_or(Error::AllocationExhausted(pool))?;
            // BLOCK_PREFIX is a constant below 32, so this cannot fail
            let addr = Ipv4Net::new(host, BLOCK_PREFIX).unwrap();
            assignment.insert(&endpoint.node, &endpoint.interface, addr);
        }
    }
    Ok(assignment)
}
