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

//! # Lab orchestration
//!
//! [`Lab`] ties everything together: one handle on the GNS3 project plus the
//! settings, with one method per operator workflow. Compilation (snapshot,
//! addressing, peering, rendering) is fatal on the first error; delivery
//! operations isolate failures per device, log them, and continue with the
//! remaining devices, so one wedged console never blocks the rest of the lab.

use crate::addressing;
use crate::peering;
use crate::render::{render_device, ConfigRenderer};
use crate::session::CommandSession;
use crate::settings::Settings;
use crate::topology::{is_router, Topology};
use crate::Result;

use gns3::{GNS3Label, GNS3Node, GNS3Server};
use log::{debug, error, info, warn};

use std::fs;

/// Daemons enabled (or disabled) on every router
const DAEMONS: [&str; 3] = ["bgpd", "ospfd", "bfdd"];

/// SVG style of interface labels carrying an address
const ADDRESSED_STYLE: &str = "font-family: TypeWriter;font-size: 10.0;\
                               font-weight: bold;fill: #444444;fill-opacity: 1.0;";

/// SVG style of plain interface labels
const PLAIN_STYLE: &str = "font-family: TypeWriter;font-size: 10.0;\
                           font-weight: bold;fill: #000000;fill-opacity: 1.0;";

/// A connected lab: the opened GNS3 project plus the operator settings
pub struct Lab {
    server: GNS3Server,
    settings: Settings,
}

impl Lab {
    /// Connect to the GNS3 server and open the configured project. Fails if the
    /// server is unreachable or the project does not exist.
    pub fn connect(settings: Settings) -> Result<Self> {
        let mut server = GNS3Server::new(&settings.gns3_host, settings.gns3_port)?;
        let project = server.open_project(&settings.project_name)?;
        info!("Opened project {} ({})", project.name, project.id);
        Ok(Self { server, settings })
    }

    /// Start every node of the project. Does nothing if all nodes already run.
    pub fn start_all(&self) -> Result<()> {
        let nodes = self.server.get_nodes()?;
        if nodes.iter().all(|n| n.status.is_started()) {
            debug!("All nodes are already started");
            return Ok(());
        }
        info!("Starting all nodes");
        self.server.start_all_nodes()?;
        Ok(())
    }

    /// Stop every node of the project. Does nothing if all nodes are stopped.
    pub fn stop_all(&self) -> Result<()> {
        let nodes = self.server.get_nodes()?;
        if nodes.iter().all(|n| n.status.is_stopped()) {
            debug!("All nodes are already stopped");
            return Ok(());
        }
        info!("Stopping all nodes");
        self.server.stop_all_nodes()?;
        Ok(())
    }

    /// Take a topology snapshot. Starts the nodes first, because the interface
    /// metadata of stopped nodes is not trustworthy.
    pub fn snapshot(&self) -> Result<Topology> {
        self.start_all()?;
        Topology::fetch(&self.server)
    }

    /// Compile the whole lab and write one config file per router into the
    /// output directory.
    pub fn generate_configs(&self, renderer: &dyn ConfigRenderer) -> Result<()> {
        let topology = self.snapshot()?;
        let assignment = addressing::interface_addresses(&topology, &self.settings)?;
        let plans = peering::device_plans(&topology, &assignment, &self.settings)?;

        fs::create_dir_all(&self.settings.output_dir)?;
        for plan in &plans {
            let path = self
                .settings
                .output_dir
                .join(format!("{}.{}", plan.name, self.settings.config_extension));
            fs::write(&path, render_device(renderer, plan))?;
            info!("Wrote {}", path.display());
        }
        info!("Generated {} configurations", plans.len());
        Ok(())
    }

    /// Deliver every generated config file to its device. Files without a
    /// matching node are skipped with a warning; a failing delivery is logged
    /// and the remaining devices still get theirs.
    pub fn apply_configs(&self) -> Result<()> {
        self.start_all()?;
        for entry in fs::read_dir(&self.settings.output_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str())
                != Some(self.settings.config_extension.as_str())
            {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let node = match self.server.get_node(&name)? {
                Some(node) => node,
                None => {
                    warn!("No node named {} exists, skipping {}", name, path.display());
                    continue;
                }
            };

            let mut commands = vec![String::from("vtysh"), String::from("conf t")];
            commands.extend(
                fs::read_to_string(&path)?
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(String::from),
            );
            commands.push(String::from("end"));
            commands.push(String::from("wr mem"));

            info!("Applying {} to {}", path.display(), name);
            if let Err(e) = self.deliver(&node, &commands) {
                error!("Failed to configure {}: {}", name, e);
            }
        }
        Ok(())
    }

    /// Wipe the stored FRR configuration of every router, then restart the lab.
    /// FRR only reads its config files on startup.
    pub fn clear_configs(&self) -> Result<()> {
        self.start_all()?;
        for node in self.routers()? {
            info!("Clearing stored configuration of {}", node.name);
            if let Err(e) = self.deliver(&node, &["rm -f /etc/frr/*.conf*"]) {
                error!("Failed to clear {}: {}", node.name, e);
            }
        }
        self.stop_all()?;
        self.start_all()
    }

    /// Enable or disable the routing daemons on every router, then restart the
    /// lab so the daemon table takes effect.
    pub fn set_daemons(&self, enabled: bool) -> Result<()> {
        self.start_all()?;
        let state = if enabled { "yes" } else { "no" };
        let commands: Vec<String> = DAEMONS
            .iter()
            .map(|d| format!("sed -i 's/^{}=.*/{}={}/' /etc/frr/daemons", d, d, state))
            .collect();
        for node in self.routers()? {
            info!("Turning daemons {} on {}", state, node.name);
            if let Err(e) = self.deliver(&node, &commands) {
                error!("Failed to set daemons on {}: {}", node.name, e);
            }
        }
        self.stop_all()?;
        self.start_all()
    }

    /// Return the lab to a blank slate: daemons off, stored configs gone.
    pub fn reset(&self) -> Result<()> {
        self.set_daemons(false)?;
        self.clear_configs()
    }

    /// Label every link endpoint on the canvas with its interface name and
    /// assigned address.
    pub fn show_address_labels(&self) -> Result<()> {
        let topology = self.snapshot()?;
        let assignment = addressing::interface_addresses(&topology, &self.settings)?;
        self.relabel(|node, iface| match assignment.get(node, iface) {
            Some(addr) => (format!("{}\n{}", iface, addr), ADDRESSED_STYLE),
            None => (iface.to_string(), PLAIN_STYLE),
        })
    }

    /// Strip the addresses off the canvas labels again
    pub fn reset_address_labels(&self) -> Result<()> {
        self.start_all()?;
        self.relabel(|_, iface| (iface.to_string(), PLAIN_STYLE))
    }

    fn relabel(&self, label: impl Fn(&str, &str) -> (String, &'static str)) -> Result<()> {
        let nodes = self.server.get_nodes()?;
        for mut link in self.server.get_links()? {
            for endpoint in link.nodes.iter_mut() {
                let node = match nodes.iter().find(|n| n.id == endpoint.node_id) {
                    Some(node) => node,
                    None => continue,
                };
                let iface = match node.interface_name(endpoint.adapter_number) {
                    Some(iface) => iface,
                    None => continue,
                };
                let (text, style) = label(&node.name, iface);
                endpoint.label = Some(GNS3Label { text, style: Some(style.to_string()) });
            }
            self.server.update_link(&link)?;
        }
        Ok(())
    }

    fn routers(&self) -> Result<Vec<GNS3Node>> {
        Ok(self.server.get_nodes()?.into_iter().filter(is_router).collect())
    }

    fn deliver<S: AsRef<str>>(&self, node: &GNS3Node, commands: &[S]) -> Result<()> {
        let mut session =
            CommandSession::connect(&self.settings.gns3_host, node.terminal_port())?;
        session.run_commands(commands)
    }
}
