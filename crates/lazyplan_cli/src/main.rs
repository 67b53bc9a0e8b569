//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `lazyplan_core` linkage without the Flutter runtime.
//! - Lay out a JSON task snapshot as one week calendar and print each block.
//!
//! Usage: `lazyplan_cli [snapshot.json [YYYY-MM-DD [settings.json]]]`

use chrono::{Local, NaiveDate};
use lazyplan_core::{GridConfiguration, LayoutService, LayoutSettings, NoCategoryColors, Task};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("lazyplan_core ping={}", lazyplan_core::ping());
    println!("lazyplan_core version={}", lazyplan_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(snapshot_path) = args.first() else {
        return ExitCode::SUCCESS;
    };
    match run(snapshot_path, args.get(1), args.get(2)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    snapshot_path: &str,
    date: Option<&String>,
    settings_path: Option<&String>,
) -> Result<(), String> {
    let raw = std::fs::read_to_string(snapshot_path)
        .map_err(|err| format!("cannot read `{snapshot_path}`: {err}"))?;
    let roots: Vec<Task> =
        serde_json::from_str(&raw).map_err(|err| format!("invalid task snapshot: {err}"))?;

    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|err| format!("invalid date `{raw}`: {err}"))?,
        None => Local::now().date_naive(),
    };

    let settings = match settings_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read `{path}`: {err}"))?;
            LayoutSettings::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => LayoutSettings::default(),
    };

    let service =
        LayoutService::new(NoCategoryColors, settings).map_err(|err| err.to_string())?;
    let pass = service.week_calendar_pass(&roots, date, GridConfiguration::compact());

    println!(
        "week start={} blocks={} unscheduled={}",
        pass.view.range().start(),
        pass.block_count(),
        pass.unscheduled.len()
    );
    for block in pass.blocks() {
        println!(
            "{} day={} col={}/{} left={:.1} top={:.1} w={:.1} h={:.1} z={} {:?}",
            block.key(),
            block.day_index,
            block.column_index,
            block.column_count,
            block.geometry.left,
            block.geometry.top,
            block.geometry.width,
            block.geometry.height,
            block.geometry.z_index,
            block.display
        );
    }
    Ok(())
}
