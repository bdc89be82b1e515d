use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use tracing::info;

use crate::{
    cancel::CancelSignal,
    errors::Error,
    models::{device::Device, identifier::Vin, reading::DiagnosticId, row::VehicleRow},
    providers::{CapabilityService, TelemetrySource},
    reconcile::{ReconcileInputs, reconcile, status_timestamps},
    requests::{WindowScan, fetch_support, point_per_entity},
};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
pub const DEFAULT_REGION: u32 = 2;

/// How the start of the scanned window is chosen. The window always ends at
/// the pass's `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStrategy {
    /// `now - days`.
    Lookback { days: u32 },
    /// The earliest device activation. Falls back to the default lookback
    /// when no device reports one.
    SinceActivation,
}

impl Default for WindowStrategy {
    fn default() -> Self {
        Self::Lookback {
            days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl WindowStrategy {
    /// Start of the window ending at `now`.
    ///
    /// Fails with [`Error::WindowOutOfRange`] when the lookback cannot be
    /// represented.
    pub fn window_start(&self, devices: &[Device], now: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        let lookback = |days: u32| {
            TimeDelta::try_days(i64::from(days))
                .and_then(|delta| now.checked_sub_signed(delta))
                .ok_or(Error::WindowOutOfRange { days })
        };
        match self {
            Self::Lookback { days } => lookback(*days),
            Self::SinceActivation => match devices
                .iter()
                .filter_map(|d| d.active_from)
                .min()
                .filter(|start| *start <= now)
            {
                Some(start) => Ok(start),
                None => lookback(DEFAULT_LOOKBACK_DAYS),
            },
        }
    }
}

/// Settings for one pass.
#[derive(Debug)]
pub struct PassOptions {
    pub window: WindowStrategy,
    /// Capability-service token. Without one, rows carry no capability data.
    pub credential: Option<SecretString>,
    pub region: u32,
    /// Page size of the window scans.
    pub page_size: usize,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            window: WindowStrategy::default(),
            credential: None,
            region: DEFAULT_REGION,
            page_size: crate::requests::PAGE_SIZE,
        }
    }
}

/// Output of a successful pass.
#[derive(Debug, Clone)]
pub struct ReconciledSet {
    /// One row per device, ordered by vehicle name.
    pub rows: Vec<VehicleRow>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// A full recomputation from source.
///
/// Requests run one at a time in a fixed order: devices, status, odometer
/// window, engine-hours window, odometer adjustments at the window end, then
/// capability batches. Any failure aborts the pass and no rows are returned.
pub struct ReconcilePass<'a, S: ?Sized, C: ?Sized> {
    source: &'a S,
    capability: &'a C,
    options: PassOptions,
}

impl<'a, S, C> ReconcilePass<'a, S, C>
where
    S: TelemetrySource + Sync + ?Sized,
    C: CapabilityService + Sync + ?Sized,
{
    pub fn new(source: &'a S, capability: &'a C, options: PassOptions) -> Self {
        Self {
            source,
            capability,
            options,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>, cancel: &CancelSignal) -> Result<ReconciledSet, Error> {
        cancel.check()?;
        let devices = self.source.list_devices().await?;
        cancel.check()?;
        let statuses = status_timestamps(self.source.list_status_info().await?);
        info!(devices = devices.len(), statuses = statuses.len(), "loaded fleet");

        let to = now;
        let from = self.options.window.window_start(&devices, now)?;

        let window_odometer = WindowScan::new(DiagnosticId::odometer(), from, to)
            .with_page_size(self.options.page_size)
            .run(self.source, cancel)
            .await?;
        let window_engine = WindowScan::new(DiagnosticId::engine_hours(), from, to)
            .with_page_size(self.options.page_size)
            .run(self.source, cancel)
            .await?;
        let odometer_adjustments =
            point_per_entity(self.source, &DiagnosticId::odometer_adjustment(), to, cancel).await?;
        info!(
            %from,
            %to,
            odometer = window_odometer.len(),
            engine = window_engine.len(),
            adjustments = odometer_adjustments.len(),
            "scanned readings"
        );

        let vins = devices.iter().filter_map(|d| Vin::normalize(d.vin.as_deref()));
        let support = fetch_support(
            self.capability,
            vins,
            self.options.credential.as_ref(),
            self.options.region,
            cancel,
        )
        .await?;

        let inputs = ReconcileInputs {
            window_odometer,
            window_engine,
            odometer_adjustments,
            status_timestamps: statuses,
            support,
        };
        let mut rows = reconcile(&devices, &inputs, now);
        rows.sort_by_cached_key(|row| row.vehicle.to_lowercase());
        info!(rows = rows.len(), "reconciliation pass complete");

        Ok(ReconciledSet { rows, from, to })
    }
}
