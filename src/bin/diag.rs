//! Command-line diagnosis front end.
//!
//! Stands in for the GUI collaborator: supplies the credential tuple from
//! argv and the environment, runs one pass, prints the transcript.

use relayscope::ProbeTarget;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relayscope=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("relayscope-diag failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(base_url), Some(model)) = (args.next(), args.next()) else {
        eprintln!("usage: relayscope-diag <base-url> <model> [org-id]");
        eprintln!("       API key is read from OPENAI_API_KEY");
        anyhow::bail!("missing arguments");
    };
    let org_id = args.next().unwrap_or_default();
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();

    let target = ProbeTarget::new(base_url, api_key, model)?.with_org_id(org_id);
    let report = relayscope::diag::diagnose_blocking(&target)?;

    println!("{}", report.detail);
    println!();
    println!("Conclusion: {}", report.conclusion);
    Ok(())
}
