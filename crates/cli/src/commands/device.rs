//! Device discovery commands

use anyhow::Result;

use opensplit_hid::HidDiscovery;

use crate::commands::DeviceCommands;
use crate::output;

/// Execute device command
pub async fn execute(cmd: &DeviceCommands, json: bool) -> Result<()> {
    match cmd {
        DeviceCommands::List { detailed } => list_keyboards(json, *detailed),
    }
}

/// List every detected keyboard without opening any of them
fn list_keyboards(json: bool, detailed: bool) -> Result<()> {
    let keyboards = HidDiscovery::new().scan()?;
    output::print_device_list(&keyboards, json, detailed);
    Ok(())
}
