//! COMPAS Audit - command line entry point
//!
//! Reads the settings, runs the audit once and prints the report. Any failure
//! prints a diagnostic with a remediation hint and exits with status 1.

use std::process;

use tracing::info;

use compas_audit::{init_logger, run_audit, AuditConfig, AuditError, AuditReport, HttpFetcher, LabelEchoClassifier, SETTINGS};

fn run() -> Result<AuditReport, AuditError> {
    let config = AuditConfig::from_settings(&SETTINGS)?;
    let fetcher = HttpFetcher::new(config.download_timeout)?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(run_audit(&config, &fetcher, &LabelEchoClassifier))
}

fn main() {
    init_logger(&SETTINGS);

    println!("╔═══════════════════════════════════════════════════╗");
    println!("║          COMPAS Audit - Fairness Report           ║");
    println!("║                  Version {:<25}║", compas_audit::VERSION);
    println!("╚═══════════════════════════════════════════════════╝");
    println!();

    info!("starting COMPAS audit");
    info!("version: {}", compas_audit::VERSION);
    info!("rustc version: {}", rustc_version_runtime::version());

    match run() {
        Ok(report) => {
            println!("{}", report);
        }
        Err(e) => {
            println!("Error: {}", e);
            if let Some(hint) = e.hint() {
                println!("Hint: {}", hint);
            }
            process::exit(1);
        }
    }
}
