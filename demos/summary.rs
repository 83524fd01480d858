//! Three console destinations and a custom renderer
//!
//! Prints a summary of the configured destinations, then one message that
//! every destination receives.
//!
//! Run with: cargo run --example summary

use chrono::{DateTime, Local};
use multilog::prelude::*;

fn compact(severity: &str, time: &DateTime<Local>, progname: Option<&str>, message: &str) -> String {
    format!(
        "{} {} [{}] {}\n",
        severity,
        progname.unwrap_or_default(),
        time.format("%y-%m-%d %H:%M:%S"),
        message
    )
}

fn main() -> Result<()> {
    let sink = MultiSink::builder()
        .progname("summary")
        .renderer(compact)
        .destination(DestinationSpec::new().named("first").device(DeviceTarget::Stdout).level("info"))
        .destination(DestinationSpec::new().named("second").device(DeviceTarget::Stdout).level("info"))
        .destination(DestinationSpec::new().named("third").device(DeviceTarget::Stdout).level("info"))
        .build()?;

    sink.summarize()?;
    sink.info("TEST")?;

    println!("\nmultilog {}", multilog::VERSION);
    Ok(())
}
