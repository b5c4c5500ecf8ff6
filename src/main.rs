use anyhow::Context;
use phish_detect::{MODEL_PATH, Report, check_email, shared_model};
use std::io::Read;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let model = shared_model().with_context(|| format!("loading classifier from {MODEL_PATH}"))?;

    let mut raw = Vec::new();
    std::io::stdin()
        .read_to_end(&mut raw)
        .context("reading email from stdin")?;

    let report = check_email(&String::from_utf8_lossy(&raw), model);
    match report {
        Report::Empty => eprintln!("{report}"),
        Report::Verdict { .. } => println!("{report}"),
    }

    Ok(())
}
