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

//! # GNS3 Server API
//!
//! A small, synchronous client for the GNS3 server REST API, scoped to driving an
//! already-built lab project: open the project by name, read the node and link
//! inventory, start and stop devices, and update link labels.
//!
//! ```no_run
//! use gns3::GNS3Server;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // connect to the server
//!     let mut server = GNS3Server::new("localhost", 3080)?;
//!
//!     // open the lab project
//!     server.open_project("frr-bgp")?;
//!
//!     // boot every device
//!     server.start_all_nodes()?;
//!
//!     for node in server.get_nodes()? {
//!         println!("{} is {:?}", node.name, node.status);
//!     }
//!     Ok(())
//! }
//! ```
#![deny(missing_docs)]

mod server;
mod types;
pub use server::GNS3Server;
pub use types::*;

use thiserror::Error;

/// # GNS3 Error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error during handling of the HTTP request
    #[allow(clippy::upper_case_acronyms)]
    #[error("HTTP Error: {0}")]
    HTTPError(#[from] isahc::Error),
    /// Cannot deserialize the response
    #[error("Cannot parse JSON response: {0}")]
    JsonError(#[from] serde_json::error::Error),
    /// IO Error
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// GNS3 Error
    #[allow(clippy::upper_case_acronyms)]
    #[error("GNS3 Error: {id}: {message}")]
    GNS3Error {
        /// Error ID
        id: u32,
        /// Error message
        message: String,
    },
    /// HTTP Response Error
    #[error("HTTP Response Error: {0}. Message:\n{1}")]
    ResponseError(u16, String),
    /// No project is selected
    #[error("No project is opened!")]
    NoProjectOpened,
    /// The named project does not exist on the server
    #[error("No project named {0} exists on the server!")]
    ProjectNotFound(String),
}

/// GNS3 Result type
type Result<T> = core::result::Result<T, Error>;
