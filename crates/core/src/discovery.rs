//! Hub discovery over a [`HidBackend`].

use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::transport::{DeviceIds, DeviceNode, HidBackend};
use crate::{DefaultBackend, PRODUCT_ID, VENDOR_ID};
use tracing::{debug, info, trace, warn};

/// Vendor/product pair every WeDo hub reports.
pub const HUB_IDS: DeviceIds = DeviceIds::new(VENDOR_ID, PRODUCT_ID);

/// Discover all connected hubs with the build's default backend.
pub fn find_hubs() -> Result<Vec<Hub>> {
    let mut backend = DefaultBackend::new()?;
    find_hubs_with(&mut backend)
}

/// Discover all connected hubs through `backend`.
///
/// Only a failure to set up the enumeration is returned. Devices that cannot
/// be opened, fail or mismatch the id query, or fail the name query are
/// skipped. Hubs are returned in enumeration order.
pub fn find_hubs_with(backend: &mut dyn HidBackend) -> Result<Vec<Hub>> {
    debug!("Starting hub enumeration");
    let nodes = backend.enumerate()?;

    let mut hubs = Vec::new();
    for node in &nodes {
        if let Some(ids) = node.ids {
            if ids != HUB_IDS {
                trace!(path = %node.path, %ids, "Skipping non-hub device");
                continue;
            }
        }

        match open_candidate(&*backend, node) {
            Ok(hub) => hubs.push(hub),
            Err(Error::NotAHub { path, .. }) => {
                trace!(path = %path, "Skipping non-hub device");
            }
            Err(e @ Error::NameQuery { .. }) => {
                warn!(path = %node.path, error = %e, "Dropping hub without a name");
            }
            Err(e) => {
                debug!(path = %node.path, error = %e, "Skipping device");
            }
        }
    }

    debug!(count = hubs.len(), "Hub enumeration complete");
    Ok(hubs)
}

/// Open a hub at a known path.
///
/// Unlike discovery, every failure is returned to the caller, and a device
/// with other ids is rejected with [`Error::NotAHub`].
pub fn open_hub(backend: &dyn HidBackend, path: &str) -> Result<Hub> {
    open_candidate(
        backend,
        &DeviceNode {
            path: path.to_string(),
            ids: None,
        },
    )
}

fn open_candidate(backend: &dyn HidBackend, node: &DeviceNode) -> Result<Hub> {
    let transport = backend.open(&node.path)?;

    let ids = transport.device_ids()?;
    if ids != HUB_IDS {
        return Err(Error::NotAHub {
            path: node.path.clone(),
            vendor_id: ids.vendor_id,
            product_id: ids.product_id,
        });
    }

    let name = transport.product_name()?;
    info!(
        name = %name,
        vid = format_args!("0x{:04X}", ids.vendor_id),
        pid = format_args!("0x{:04X}", ids.product_id),
        path = %node.path,
        "Found WeDo hub"
    );
    Ok(Hub::new(name, node.path.clone(), transport))
}
