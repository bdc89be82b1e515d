use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fleet_report::{
    config::{ReportConfig, load_config_path},
    render::{engine_table, odometer_table, rollup_table},
};
use fleet_telemetry::{
    CancelHandle,
    io::{JsonSink, export},
    models::row::{EngineSource, OdometerSource},
    providers::{geotab_rest::GeotabProvider, myadmin_rest::MyAdminClient},
    reconcile::ReconcilePass,
    views::{
        EngineFilter, OdometerFilter, RowSortKey, SortDirection, SortState, SourceFilter,
        SummarySortKey, engine_view, odometer_view, rollup_view,
    },
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the config file (fleet_report.toml). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass and print the views
    Run {
        /// Case-insensitive brand/model substring applied to both row views
        #[arg(long, default_value = "")]
        filter: String,

        /// Odometer source filter: ALL, DEVICE_DIAGNOSTIC or GPS_DERIVED
        #[arg(long, default_value = "ALL")]
        odometer_source: SourceFilter<OdometerSource>,

        /// Engine source filter: ALL, ENGINE_DIAGNOSTIC or GPS_DERIVED
        #[arg(long, default_value = "ALL")]
        engine_source: SourceFilter<EngineSource>,

        /// Sort key of the row views (e.g. vehicle, odometer_km, odometer_age)
        #[arg(long, default_value = "vehicle")]
        sort: RowSortKey,

        /// Sort the row views descending
        #[arg(long)]
        desc: bool,

        /// Sort key of the model rollup
        #[arg(long, default_value = "fallback_odometer_pct")]
        rollup_sort: SummarySortKey,

        /// Directory to export the odometer and engine-hours sheets to
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the effective configuration, secrets redacted
    Config,
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<ReportConfig> {
    let mut config = match path {
        Some(path) => load_config_path(path)?,
        None => ReportConfig::default(),
    };
    config.apply_env().context("invalid environment override")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load(cli.config.as_ref())?;

    match cli.command {
        Commands::Config => {
            println!("{config:#?}");
        }

        Commands::Run {
            filter,
            odometer_source,
            engine_source,
            sort,
            desc,
            rollup_sort,
            out,
        } => {
            let source = GeotabProvider::new(config.server()?)
                .context("failed to initialise telemetry source")?;
            let capability = MyAdminClient::with_endpoint(config.capability.endpoint.as_str())
                .context("failed to initialise capability client")?;
            if config.capability.token.is_none() {
                warn!("no capability token configured; support columns will be empty");
            }

            let (handle, signal) = CancelHandle::new();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.cancel();
                }
            });

            let now = Utc::now();
            let set = ReconcilePass::new(&source, &capability, config.pass_options())
                .run(now, &signal)
                .await
                .context("reconciliation pass failed")?;
            info!(rows = set.rows.len(), from = %set.from, to = %set.to, "pass finished");

            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let row_sort = SortState::for_rows(sort).with_direction(direction);

            let odometer = odometer_view(
                &set.rows,
                &OdometerFilter::new(filter.as_str(), odometer_source),
                &row_sort,
            );
            let engine = engine_view(
                &set.rows,
                &EngineFilter::new(filter.as_str(), engine_source),
                &row_sort,
            );
            let rollup = rollup_view(
                &set.rows,
                &SortState::for_rollup(rollup_sort),
                config.view.alert_threshold,
            );

            println!("Window {} .. {}\n", set.from, set.to);
            println!("Odometer ({} of {})", odometer.len(), set.rows.len());
            println!("{}", odometer_table(&odometer, now));
            println!("Engine hours ({} of {})", engine.len(), set.rows.len());
            println!("{}", engine_table(&engine, now));
            println!(
                "Models (flagged above {}% GPS-derived odometer)",
                config.view.alert_threshold
            );
            println!("{}", rollup_table(&rollup));

            if let Some(dir) = out {
                let paths = export(&JsonSink::new(dir), &set.rows, now)
                    .await
                    .context("failed to export sheets")?;
                for path in paths {
                    println!("{}", path.display());
                }
            }
        }
    }
    Ok(())
}
