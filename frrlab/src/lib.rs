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

//! # FrrLab
//!
//! FrrLab compiles a GNS3 lab topology of FRR routers into per-device configuration
//! text, and pushes that text onto the devices over their console sessions.
//!
//! The pipeline is a one-way data flow:
//!
//! 1. [`topology`] takes a snapshot of the project (nodes, links, interface names)
//!    and classifies links and devices.
//! 2. [`addressing`] carves the point-to-point supernet into per-link /30 blocks,
//!    split into a core-internal and a cross-boundary pool, and assigns one host
//!    address per router interface. Operator-supplied external addresses are
//!    recorded verbatim instead of being drawn from a pool.
//! 3. [`roles`] derives a stable, human-decodable router ID from each device name.
//! 4. [`peering`] turns the snapshot and the address assignment into per-device
//!    OSPF and BGP plans (eBGP neighbors, an emulated iBGP full mesh between the
//!    core border routers, and the external gateway session or default route).
//! 5. [`render`] writes the plans out as FRR vtysh configuration text.
//! 6. [`session`] replays the text onto a device, line by line, over a shared and
//!    possibly contended console.
//!
//! [`lab::Lab`] sequences the whole thing and owns the connection to the GNS3
//! server; there is no global state.

pub mod addressing;
mod error;
pub mod lab;
pub mod peering;
pub mod render;
pub mod roles;
pub mod session;
pub mod settings;
pub mod topology;

pub use error::Error;
pub use lab::Lab;
pub use settings::Settings;

/// FrrLab result type
pub type Result<T> = std::result::Result<T, Error>;
