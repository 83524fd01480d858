//! Console for warnings, a rotating file for everything
//!
//! Run with: cargo run --example console_and_file

use multilog::prelude::*;
use multilog::{info, warn};

fn main() -> Result<()> {
    println!("=== multilog - Console and File Example ===\n");

    let log_path = std::env::temp_dir().join("multilog_demo/app.log");

    let sink = MultiSink::builder()
        .progname("demo")
        .destination(
            DestinationSpec::new()
                .named("console")
                .device(DeviceTarget::Stderr)
                .level(LogLevel::Warn),
        )
        .destination(
            DestinationSpec::new()
                .named("file")
                .device(log_path.as_path())
                .level(LogLevel::Debug)
                .rotation_age(3)
                .rotation_size(64 * 1024),
        )
        .build()?;

    println!("1. Logging at different levels:");
    sink.debug("This is a debug message")?;
    sink.info("This is an info message")?;
    sink.warn("This is a warning message")?;
    sink.error("This is an error message")?;

    println!("\n2. Formatted messages:");
    let port = 8080;
    info!(sink, "Listening on port {}", port)?;
    warn!(sink, "{} connections pending", 12)?;

    println!("\n3. Changing the console level:");
    sink.set_level(Some("console"), "debug")?;
    sink.debug("Now visible on the console too")?;

    println!("\n4. Destinations:");
    for line in sink.summarize()? {
        println!("   {}", line);
    }

    sink.close()?;
    println!("\nFile output written to {}", log_path.display());
    Ok(())
}
