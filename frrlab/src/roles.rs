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

//! # Device naming conventions
//!
//! Device names follow the pattern `asn<digits><role-word><digits>`, e.g.
//! `asn1border2` or `asn6cpe1`. This module is the single place that pattern is
//! parsed: [`NodeClass::parse`] produces the role, the AS number and the router
//! identity digits, and everything that needs role or AS information consumes
//! the result. Parsing is total; names that do not match degrade to sentinels
//! instead of erroring.

use regex::Regex;
use std::net::Ipv4Addr;

/// Sentinel octet used in router IDs when the name cannot be parsed
const UNPARSED: u8 = 255;

/// Role of a device, classified by naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A router terminating external, inter-domain peerings
    Border,
    /// A router internal to its AS
    Internal,
    /// A customer-edge router
    Edge,
    /// No recognized role word in the name
    Unknown,
}

impl Role {
    fn octet(self) -> u8 {
        match self {
            Role::Border => 0,
            Role::Internal => 1,
            Role::Edge => 2,
            Role::Unknown => UNPARSED,
        }
    }
}

/// Everything the naming convention encodes about one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeClass {
    /// The role word found in the name
    pub role: Role,
    /// AS number from the leading `asn<digits>` tag, if present
    pub asn: Option<u32>,
    /// (AS, number) octets from the full identity pattern; `None` if the full
    /// pattern did not match or the digits do not fit an octet
    ident: Option<(u8, u8)>,
}

impl NodeClass {
    /// Parse a device name. Never fails.
    pub fn parse(name: &str) -> Self {
        let role = if name.contains("border") {
            Role::Border
        } else if name.contains("internal") {
            Role::Internal
        } else if name.contains("cpe") {
            Role::Edge
        } else {
            Role::Unknown
        };

        let asn_re = Regex::new(r"^asn(\d+)").unwrap();
        let ident_re = Regex::new(r"^asn(\d+)[a-zA-Z]+(\d+)").unwrap();

        let asn = asn_re.captures(name).and_then(|c| c.get(1).unwrap().as_str().parse().ok());
        let ident = ident_re.captures(name).and_then(|c| {
            let asn: u8 = c.get(1).unwrap().as_str().parse().ok()?;
            let num: u8 = c.get(2).unwrap().as_str().parse().ok()?;
            Some((asn, num))
        });

        Self { role, asn, ident }
    }

    /// The router ID encoded as `0.<role>.<asn>.<num>`, e.g. `0.0.1.2` for
    /// `asn1border2`. Stable across runs, and decodable by a human reading the
    /// device output. Unparseable parts are 255.
    pub fn router_id(&self) -> Ipv4Addr {
        let (asn, num) = self.ident.unwrap_or((UNPARSED, UNPARSED));
        Ipv4Addr::new(0, self.role.octet(), asn, num)
    }

    /// True iff the device takes part in BGP (border and customer-edge roles only)
    pub fn is_bgp_speaker(&self) -> bool {
        matches!(self.role, Role::Border | Role::Edge)
    }
}

/// Shorthand for `NodeClass::parse(name).router_id()`
pub fn router_id(name: &str) -> Ipv4Addr {
    NodeClass::parse(name).router_id()
}

/// Shorthand for `NodeClass::parse(name).asn`
pub fn as_number(name: &str) -> Option<u32> {
    NodeClass::parse(name).asn
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roles() {
        assert_eq!(NodeClass::parse("asn1border1").role, Role::Border);
        assert_eq!(NodeClass::parse("asn1internal2").role, Role::Internal);
        assert_eq!(NodeClass::parse("asn6cpe1").role, Role::Edge);
        assert_eq!(NodeClass::parse("alpine-1").role, Role::Unknown);
    }

    #[test]
    fn identities() {
        assert_eq!(router_id("asn2border1"), Ipv4Addr::new(0, 0, 2, 1));
        assert_eq!(router_id("asn1internal2"), Ipv4Addr::new(0, 1, 1, 2));
        assert_eq!(router_id("asn6cpe1"), Ipv4Addr::new(0, 2, 6, 1));
        assert_eq!(router_id("not-a-match"), Ipv4Addr::new(0, 255, 255, 255));
    }

    #[test]
    fn partial_names_degrade() {
        // role word without the numeric pattern
        assert_eq!(router_id("borderfoo"), Ipv4Addr::new(0, 0, 255, 255));
        // leading tag without a trailing number
        assert_eq!(router_id("asn5"), Ipv4Addr::new(0, 255, 255, 255));
        assert_eq!(as_number("asn5"), Some(5));
    }

    #[test]
    fn octet_overflow_is_sentinel() {
        assert_eq!(router_id("asn300border1"), Ipv4Addr::new(0, 0, 255, 255));
        // the AS number itself is still extracted
        assert_eq!(as_number("asn300border1"), Some(300));
    }

    #[test]
    fn as_numbers() {
        assert_eq!(as_number("asn1border1"), Some(1));
        assert_eq!(as_number("asn6cpe1"), Some(6));
        assert_eq!(as_number("alpine-1"), None);
    }

    #[test]
    fn bgp_speakers() {
        assert!(NodeClass::parse("asn1border1").is_bgp_speaker());
        assert!(NodeClass::parse("asn6cpe1").is_bgp_speaker());
        assert!(!NodeClass::parse("asn1internal1").is_bgp_speaker());
        assert!(!NodeClass::parse("alpine-1").is_bgp_speaker());
    }
}
