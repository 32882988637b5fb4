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

use frrlab::render::FrrRenderer;
use frrlab::{Lab, Settings};

use clap::{Parser, Subcommand};
use log::*;

use std::error::Error;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let args = CommandLineArguments::parse();
    let settings = load_settings(args.settings)?;
    let lab = Lab::connect(settings)?;

    match args.cmd {
        MainCommand::StartAll => lab.start_all()?,
        MainCommand::StopAll => lab.stop_all()?,
        MainCommand::EnableDaemons => lab.set_daemons(true)?,
        MainCommand::DisableDaemons => lab.set_daemons(false)?,
        MainCommand::GenerateConfigs => lab.generate_configs(&FrrRenderer)?,
        MainCommand::ApplyConfigs => lab.apply_configs()?,
        MainCommand::Clear => lab.clear_configs()?,
        MainCommand::Reset => lab.reset()?,
        MainCommand::ShowAddressLabels => lab.show_address_labels()?,
        MainCommand::ResetLabels => lab.reset_address_labels()?,
    }

    Ok(())
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, frrlab::Error> {
    match path {
        Some(path) => Settings::load(path),
        None if Path::new("settings.json").is_file() => Settings::load("settings.json"),
        None => {
            info!("No settings file found, using the built-in defaults");
            Ok(Settings::default())
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "frrlab", author, version)]
struct CommandLineArguments {
    /// Path to the settings file (defaults to ./settings.json if it exists)
    #[clap(short = 's', long, global = true)]
    settings: Option<PathBuf>,
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Start every node of the project
    #[clap(name = "start-all")]
    StartAll,
    /// Stop every node of the project
    #[clap(name = "stop-all")]
    StopAll,
    /// Enable the routing daemons on every router and restart the lab
    #[clap(name = "enable-daemons")]
    EnableDaemons,
    /// Disable the routing daemons on every router and restart the lab
    #[clap(name = "disable-daemons")]
    DisableDaemons,
    /// Compile the topology and write one config file per router
    #[clap(name = "generate-configs")]
    GenerateConfigs,
    /// Deliver the generated config files onto the devices
    #[clap(name = "apply-configs")]
    ApplyConfigs,
    /// Wipe the stored FRR configuration of every router and restart the lab
    #[clap(name = "clear")]
    Clear,
    /// Disable the daemons and wipe the stored configuration
    #[clap(name = "reset")]
    Reset,
    /// Draw interface names and assigned addresses on the canvas
    #[clap(name = "show-address-labels")]
    ShowAddressLabels,
    /// Strip the addresses off the canvas labels
    #[clap(name = "reset-labels")]
    ResetLabels,
}
