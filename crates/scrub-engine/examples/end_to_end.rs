//! Scan a prompt and a model response, printing the redacted text.
//!
//! Usage: `cargo run -p scrub-engine --example end_to_end [vault.json]`

use anyhow::Result;
use scrub_audit::JsonlAuditor;
use scrub_core::{FileVaultLoader, Vault, VaultLoader};
use scrub_engine::Guard;
use scrub_security::{ExactDetector, PatternDetector};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let vault = match std::env::args().nth(1) {
        Some(path) => FileVaultLoader::new(path).load()?,
        None => Vault::builder()
            .exact_set("api_keys", ["sk-live-abc123"])
            .exact_set("emails", ["admin@example.com"])
            .pattern("emails", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .pattern("ssn", r"\d{3}-\d{2}-\d{4}")
            .build(),
    };

    let log_path = "detections.log.jsonl";
    let guard = Guard::builder(vault)
        .detector(ExactDetector::new(["api_keys", "emails"]))
        .detector(PatternDetector::new())
        .auditor(JsonlAuditor::new(log_path))
        .build();

    let prompt = concat!(
        "Please summarize this and email the result to admin@example.com. ",
        "My API key is sk-live-abc123."
    );
    let input = guard.inspect_input(prompt)?;

    // Stand-in for a model response that leaks data
    let response = concat!(
        "Summary: ... Contact us at careers@company.com. ",
        "By the way, here is a suspicious number 123-45-6789."
    );
    let output = guard.inspect_output(response)?;

    println!("=== INPUT (redacted) ===");
    println!("{}", input.redacted);
    println!("\n=== OUTPUT (redacted) ===");
    println!("{}", output.redacted);
    println!("\n=== DETECTIONS (counts) ===");
    println!(
        "input:  {}  | output: {}",
        input.report.matches.len(),
        output.report.matches.len()
    );
    println!("\nLogged events -> {log_path}");

    Ok(())
}
