//! The composed factory-update flow
//!
//! Resolution and validation run first; the device session is opened only
//! once both have passed, held for exactly one engine run, and released on
//! every exit path. The scratch directory behind any unpacked bundle
//! members lives until the run finishes, successful or not.

use std::path::Path;

use opensplit_bundle::resolver;
use opensplit_device_types::DeviceVariant;
use tracing::{debug, info};

use crate::engine::{UpdateEngine, UpdateReport};
use crate::error::{DeviceError, FactoryUpdateError};
use crate::plan::UpdatePlan;
use crate::ports::DeviceOps;
use crate::preconditions;

/// Run the full factory-update flow for one keyboard.
///
/// `connect` opens the device session and is invoked only after every
/// precondition has passed, so a rejected bundle or layout token provably
/// causes zero device contact. The session is owned by this function and
/// dropped before it returns, on success and failure alike.
///
/// # Errors
///
/// Returns [`FactoryUpdateError`] preserving the failure class: bundle
/// resolution, precondition, session connect, or step execution.
pub async fn factory_update<D, F>(
    engine: &UpdateEngine,
    bundle_root: &Path,
    layout_token: &str,
    variant: DeviceVariant,
    connect: F,
) -> Result<UpdateReport, FactoryUpdateError>
where
    D: DeviceOps,
    F: FnOnce() -> Result<D, DeviceError>,
{
    let artifacts = resolver::resolve(bundle_root, variant)?;
    let layout = preconditions::validate(&artifacts, layout_token)?;

    let plan = UpdatePlan::build(variant, &artifacts, layout);
    debug!(steps = plan.steps.len(), %layout, "built update plan");

    let device = connect().map_err(FactoryUpdateError::Connect)?;
    info!(%variant, "device session open");

    let report = engine.run(&plan, &device).await?;
    // `device` drops here, releasing the handle; `artifacts` drops after,
    // removing any scratch the resolver created.
    Ok(report)
}
