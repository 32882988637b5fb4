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

//! # GNS3 Types

use serde::{Deserialize, Serialize};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GNS3ResponseVersion {
    pub version: String,
}

/// Project Information
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Project {
    /// ID of the project
    #[serde(rename = "project_id")]
    pub id: String,
    /// Name of the project
    pub name: String,
    /// Status of the project
    pub status: GNS3ProjectStatus,
}

#[allow(clippy::upper_case_acronyms)]
/// Project Status
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum GNS3ProjectStatus {
    /// Open status
    #[serde(rename = "opened")]
    Opened,
    /// Close status
    #[serde(rename = "closed")]
    Closed,
}

/// Node Information
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Node {
    /// ID of the node
    #[serde(rename = "node_id")]
    pub id: String,
    /// name of the node
    pub name: String,
    /// type of the node (e.g., docker)
    pub node_type: String,
    /// Port of the primary console
    #[serde(rename = "console")]
    pub port: u16,
    /// Status of the node
    pub status: GNS3NodeStatus,
    /// Interfaces of the node
    #[serde(rename = "ports")]
    pub interfaces: Vec<GNS3Interface>,
    /// Node-type specific properties (image name, aux console port, ...)
    #[serde(default)]
    pub properties: Option<GNS3NodeProperties>,
}

impl GNS3Node {
    /// Port of the auxiliary console if the node has one, otherwise the primary console port.
    /// FRR containers must be driven over the aux port.
    pub fn terminal_port(&self) -> u16 {
        self.properties.as_ref().and_then(|p| p.aux).unwrap_or(self.port)
    }

    /// Name of the interface behind the given adapter number, if it exists.
    pub fn interface_name(&self, adapter_number: u32) -> Option<&str> {
        self.interfaces
            .iter()
            .find(|i| i.adapter_number == adapter_number)
            .map(|i| i.short_name.as_str())
    }
}

/// Node-type specific properties. Only the fields this crate's users need are kept.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct GNS3NodeProperties {
    /// Disk or container image the node runs
    #[serde(default)]
    pub image: Option<String>,
    /// Port of the auxiliary console (docker nodes)
    #[serde(default)]
    pub aux: Option<u16>,
}

/// Node Status
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum GNS3NodeStatus {
    /// Node is stopped
    #[serde(rename = "stopped")]
    Stopped,
    /// Node is started
    #[serde(rename = "started")]
    Started,
    /// Node is suspended
    #[serde(rename = "suspended")]
    Suspended,
}

impl GNS3NodeStatus {
    /// Returns true if the node is started
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
    /// Returns true if the node is stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Interface Information
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Interface {
    /// adapter number
    pub adapter_number: u32,
    /// port number
    pub port_number: u32,
    /// Name of the interface
    pub name: String,
    /// Short name of the interface
    pub short_name: String,
    /// Link type (Ethernet, etc...)
    pub link_type: String,
}

/// Link data
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Link {
    /// ID of the link
    #[serde(rename = "link_id")]
    pub id: String,
    /// nodes which the link connects
    pub nodes: [GNS3LinkEndpoint; 2],
}

/// Endpoint of a link
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GNS3LinkEndpoint {
    /// ID of the node for which the link is configured
    pub node_id: String,
    /// adapter number
    pub adapter_number: u32,
    /// port number
    pub port_number: u32,
    /// Label drawn at this end of the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<GNS3Label>,
}

/// Text label drawn on the canvas
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GNS3Label {
    /// Label text
    pub text: String,
    /// SVG style string applied to the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}
