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

//! # GNS3 Server

use crate::types::*;
use crate::{Error, Result};

use isahc::prelude::*;
use regex::Regex;

/// # GNS3 Server Handle
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Clone)]
pub struct GNS3Server {
    address: String,
    version: String,
    project: Option<String>,
}

impl GNS3Server {
    /// Create a new instance of a server handler
    pub fn new(address: impl AsRef<str>, port: u16) -> Result<Self> {
        let address = format!("http://{}:{}", address.as_ref(), port);
        let version_addr = format!("{}/v2/version", address);
        let v: GNS3ResponseVersion = serde_json::from_str(&isahc::get(&version_addr)?.text()?)?;
        Ok(Self { address, version: v.version, project: None })
    }

    /// Get the version
    pub fn version(&self) -> &str {
        self.version.as_ref()
    }

    /// Returns all project informations
    pub fn get_projects(&self) -> Result<Vec<GNS3Project>> {
        Ok(serde_json::from_str(&self.request_get("projects")?)?)
    }

    /// Look up a project by name, open it on the server if it is closed, and select it as the
    /// project all following calls operate on.
    pub fn open_project(&mut self, name: impl AsRef<str>) -> Result<GNS3Project> {
        let project = self
            .get_projects()?
            .into_iter()
            .find(|p| p.name == name.as_ref())
            .ok_or_else(|| Error::ProjectNotFound(name.as_ref().to_string()))?;
        let project = if project.status == GNS3ProjectStatus::Closed {
            serde_json::from_str(
                &self.request_post(format!("projects/{}/open", project.id), String::from("{}"))?,
            )?
        } else {
            project
        };
        self.project = Some(project.id.clone());
        Ok(project)
    }

    /// Return all nodes in the project
    pub fn get_nodes(&self) -> Result<Vec<GNS3Node>> {
        let project_id = self.project_id()?;
        Ok(serde_json::from_str(&self.request_get(format!("projects/{}/nodes", project_id))?)?)
    }

    /// Return the node with the given name, or `None` if no such node exists
    pub fn get_node(&self, name: impl AsRef<str>) -> Result<Option<GNS3Node>> {
        Ok(self.get_nodes()?.into_iter().find(|n| n.name == name.as_ref()))
    }

    /// Return all links in the project
    pub fn get_links(&self) -> Result<Vec<GNS3Link>> {
        let project_id = self.project_id()?;
        Ok(serde_json::from_str(&self.request_get(format!("projects/{}/links", project_id))?)?)
    }

    /// Rewrite the endpoint records of an existing link. Used to change the labels drawn at the
    /// ends of the link.
    pub fn update_link(&self, link: &GNS3Link) -> Result<GNS3Link> {
        let project_id = self.project_id()?;
        Ok(serde_json::from_str(&self.request_put(
            format!("projects/{}/links/{}", project_id, link.id),
            format!("{{ \"nodes\": {} }}", serde_json::to_string(&link.nodes)?),
        )?)?)
    }

    /// Start all nodes in the project. Blocks until the server reports the request done.
    pub fn start_all_nodes(&self) -> Result<()> {
        let project_id = self.project_id()?;
        self.request_post(format!("projects/{}/nodes/start", project_id), String::from("{}"))?;
        Ok(())
    }

    /// Stop all nodes in the project. Blocks until the server reports the request done.
    pub fn stop_all_nodes(&self) -> Result<()> {
        let project_id = self.project_id()?;
        self.request_post(format!("projects/{}/nodes/stop", project_id), String::from("{}"))?;
        Ok(())
    }

    /// Start a specific node
    pub fn start_node(&self, node_id: impl AsRef<str>) -> Result<GNS3Node> {
        let project_id = self.project_id()?;
        Ok(serde_json::from_str(&self.request_post(
            format!("projects/{}/nodes/{}/start", project_id, node_id.as_ref()),
            String::from("{}"),
        )?)?)
    }

    /// Stop a specific node
    pub fn stop_node(&self, node_id: impl AsRef<str>) -> Result<GNS3Node> {
        let project_id = self.project_id()?;
        Ok(serde_json::from_str(&self.request_post(
            format!("projects/{}/nodes/{}/stop", project_id, node_id.as_ref()),
            String::from("{}"),
        )?)?)
    }

    fn project_id(&self) -> Result<String> {
        Ok(self.project.as_ref().ok_or(Error::NoProjectOpened)?.clone())
    }

    fn request_get(&self, key: impl AsRef<str>) -> Result<String> {
        let addr = format!("{}/v2/{}", self.address, key.as_ref());
        self.handle_response(isahc::get(&addr)?)
    }

    fn request_post(&self, key: impl AsRef<str>, data: String) -> Result<String> {
        let addr = format!("{}/v2/{}", self.address, key.as_ref());
        self.handle_response(isahc::post(&addr, data)?)
    }

    fn request_put(&self, key: impl AsRef<str>, data: String) -> Result<String> {
        let addr = format!("{}/v2/{}", self.address, key.as_ref());
        self.handle_response(isahc::put(&addr, data)?)
    }

    fn handle_response(&self, mut response: Response<Body>) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ResponseError(status.as_u16(), response.text()?));
        }
        let response = response.text()?;
        let error_re = Regex::new(r"^(\d*): (.*)$").unwrap();
        match error_re.captures(&response) {
            Some(captures) if captures.len() == 3 => {
                let error_id: u32 = captures.get(1).unwrap().as_str().parse().unwrap();
                let error_text: String = captures.get(2).unwrap().as_str().to_string();
                Err(Error::GNS3Error { id: error_id, message: error_text })
            }
            _ => Ok(response),
        }
    }
}
