//! The built-in profile: one bare-metal node booting a fixed disk image.

use std::io::Write;

use crate::config::ProfileConfig;
use crate::context::Context;
use crate::error::LabspecError;
use crate::request::{ExecuteService, InstallService, Request};
use crate::tour_xml::Tour;

/// Name of the single node declared by the built-in profile.
pub const DEFAULT_NODE_NAME: &str = "node1";

/// Disk image the built-in profile boots.
pub const DEFAULT_DISK_IMAGE: &str = "urn:publicid:IDN+emulab.net+image+UBUNTU20-64-STD";

/// Build the built-in one-node request.
///
/// Takes no input and reads nothing from the environment — the same
/// request comes back on every call.
pub fn default_request() -> Result<Request, LabspecError> {
    let mut request = Request::new();
    let node = request.raw_pc(DEFAULT_NODE_NAME)?;
    node.disk_image = Some(DEFAULT_DISK_IMAGE.to_string());
    Ok(request)
}

/// Build a request from a parsed profile description.
pub fn from_config(config: &ProfileConfig) -> Result<Request, LabspecError> {
    let mut request = Request::new();

    for nc in &config.nodes {
        let node = match nc.kind.as_str() {
            "xen-vm" => request.xen_vm(&nc.name)?,
            _ => request.raw_pc(&nc.name)?,
        };
        node.disk_image = Some(nc.disk_image.clone());
        node.hardware_type = nc.hardware_type.clone();
        node.routable_ip = nc.routable_ip;
        for exec in &nc.execute {
            node.execute.push(ExecuteService {
                shell: exec.shell.clone(),
                command: exec.command.clone(),
            });
        }
        for install in &nc.install {
            node.install.push(InstallService {
                url: install.url.clone(),
                path: install.path.clone(),
            });
        }
    }

    Ok(request)
}

/// Tour attached to a profile description, if any.
pub fn tour_from_config(config: &ProfileConfig) -> Option<Tour> {
    config.tour.as_ref().map(|t| Tour {
        description: t.description.clone(),
        instructions: t.instructions.clone(),
    })
}

/// Serialize a request and write it to `out` exactly once.
pub fn emit(
    request: Request,
    tour: Option<Tour>,
    out: &mut dyn Write,
) -> Result<(), LabspecError> {
    let mut ctx = Context::new();
    ctx.bind_request(request)?;
    if let Some(tour) = tour {
        ctx.set_tour(tour);
    }
    ctx.print_request_rspec(out)
}
