use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{Instrument, error, info, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::mprint;
use crate::terminal::observer::TerminalObserver;
use crate::terminal::{colors, format, print, spinner};
use flock_backend::{MdnsBackend, SimulatedBackend};
use flock_common::backend::DiscoveryBackend;
use flock_common::config::Config;
use flock_common::device::DeviceRecord;
use flock_core::DiscoverySession;

pub async fn discover(cfg: &Config, simulate: bool) -> anyhow::Result<ExitCode> {
    let backend: Arc<dyn DiscoveryBackend> = if simulate {
        info!("Using simulated devices");
        Arc::new(SimulatedBackend::demo())
    } else {
        Arc::new(MdnsBackend::new())
    };
    run(backend, cfg).await
}

/// Runs one scan and prints what it found. A failed scan is reported once and
/// turns into a failing exit code.
async fn run(backend: Arc<dyn DiscoveryBackend>, cfg: &Config) -> anyhow::Result<ExitCode> {
    let span = info_span!("discovery", indicatif.pb_show = true);
    span.pb_set_style(&spinner::style());

    let start_time: Instant = Instant::now();
    let (session, events) = DiscoverySession::new(backend, cfg);
    let handle = session
        .start()
        .context("a discovery is already in progress")?;
    drop(session);

    let mut observer = TerminalObserver::new(span.clone());
    let (outcome, ()) = tokio::join!(
        handle,
        flock_core::dispatch(events, &mut observer).instrument(span)
    );

    let outcome = outcome.context("discovery task did not complete")?;

    let devices: Vec<DeviceRecord> = observer.into_devices();
    if let Err(err) = outcome {
        error!("{err}");
        discovery_ends(&devices, start_time.elapsed(), cfg);
        return Ok(ExitCode::FAILURE);
    }
    discovery_ends(&devices, start_time.elapsed(), cfg);
    Ok(ExitCode::SUCCESS)
}

fn discovery_ends(devices: &[DeviceRecord], total_time: Duration, cfg: &Config) {
    if devices.is_empty() {
        no_devices_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("mdns discovery", cfg.quiet);
    print_devices(devices, cfg);
    print_summary(devices.len(), total_time, cfg);
}

fn no_devices_found(cfg: &Config) {
    print::header("zero devices detected", cfg.quiet);
    print::no_results();
    print::end_of_program();
}

fn print_devices(devices: &[DeviceRecord], cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }
    for (idx, device) in devices.iter().enumerate() {
        print::tree_head(idx, device.name());
        print::as_tree_one_level(format::device_to_details(device));
        if idx + 1 != devices.len() {
            mprint!();
        }
    }
}

fn print_summary(devices_len: usize, total_time: Duration, cfg: &Config) {
    let found: ColoredString = format!("{devices_len} devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString = format!("Discovery Complete: {found} identified in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            mprint!();
            info!("{}", output);
        }
    }
}
