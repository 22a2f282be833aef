use anyhow::Result;
use stablepin_core::{build_change_report, ChangeRecord, PackageHost, PinStore, ReportSink};

use crate::Reconciler;

/// Called by the host right before it refreshes catalog data. Appends the
/// current pin list to `pins` and returns how many entries were new.
pub fn refresh_hook(reconciler: &Reconciler<'_>, pins: &mut dyn PinStore) -> Result<usize> {
    let pin_list = reconciler.build_pin_list().into_iter().collect::<Vec<_>>();
    let added = pins.append_pins(&pin_list)?;
    tracing::info!(candidates = pin_list.len(), added, "merged stable pins");
    Ok(added)
}

/// Runs a reconciliation and reports the outcome through `sink`.
/// Host failures propagate before anything is reported.
pub fn reconcile_command(
    reconciler: &Reconciler<'_>,
    host: &mut dyn PackageHost,
    sink: &mut dyn ReportSink,
) -> Result<Vec<ChangeRecord>> {
    let changes = reconciler.reconcile(host)?;
    build_change_report(&changes).deliver(sink);
    Ok(changes)
}
