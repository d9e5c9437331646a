// ── Sync pass ──
//
// The end-to-end flow once a session exists: confirm the device group,
// snapshot its rules, then reconcile the rule file against them. Any
// error returned from here is fatal; per-row problems live in the report.

use std::path::Path;

use tracing::{debug, info};

use crate::config::ReconcileOptions;
use crate::device::{DeviceApi, GroupSink, device_group_exists};
use crate::error::CoreError;
use crate::index::RemoteRuleIndex;
use crate::model::ManagedDevice;
use crate::reconcile::{ReconciliationReport, Reconciler, RowOutcome};
use crate::source::RuleSource;

/// What to reconcile, and where.
#[derive(Debug, Clone)]
pub struct SyncRequest<'a> {
    pub device_group: &'a str,
    pub rule_file: &'a Path,
    pub options: ReconcileOptions,
}

/// Phase transitions of a sync pass, emitted in order.
#[derive(Debug)]
pub enum SyncEvent<'a> {
    DevicesListed { devices: &'a [ManagedDevice] },
    DeviceGroupConfirmed { group: &'a str },
    ExistingRulesFetched { count: usize },
    RuleFileOpened { path: &'a Path },
    Row(&'a RowOutcome),
}

/// Run one create-only pass.
///
/// Halts with [`CoreError::DeviceGroupNotFound`] before the rule file is
/// opened when no listed device matches the requested group.
pub async fn run_sync<D, F>(
    device: &D,
    request: &SyncRequest<'_>,
    mut progress: F,
) -> Result<ReconciliationReport, CoreError>
where
    D: DeviceApi,
    F: FnMut(SyncEvent<'_>),
{
    let group = request.device_group;
    if group.trim().is_empty() {
        return Err(CoreError::Config {
            message: "device group name must not be blank".into(),
        });
    }

    let devices = device.list_devices().await?;
    debug!(count = devices.len(), "devices listed");
    progress(SyncEvent::DevicesListed { devices: &devices });

    if !device_group_exists(&devices, group) {
        return Err(CoreError::DeviceGroupNotFound { name: group.into() });
    }
    progress(SyncEvent::DeviceGroupConfirmed { group });

    let existing = device.list_existing_rules(group).await?;
    let index = RemoteRuleIndex::build(&existing);
    info!(group, existing = index.len(), "remote rules indexed");
    progress(SyncEvent::ExistingRulesFetched { count: index.len() });

    let source = RuleSource::open(request.rule_file)?;
    progress(SyncEvent::RuleFileOpened {
        path: request.rule_file,
    });

    let sink = GroupSink::new(device, group);
    let report = Reconciler::new(&index, request.options.clone())
        .run(source, &sink, |outcome| progress(SyncEvent::Row(outcome)))
        .await;
    Ok(report)
}
