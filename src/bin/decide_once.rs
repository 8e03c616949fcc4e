//! Evaluate one command against a synthesized (optionally preset) state and print
//! the state and the decision as JSON.
//!
//! Usage: decide_once <command> [preset] [seed]

use anyhow::{bail, Context, Result};
use cockpit::policy::PolicyEngine;
use cockpit::vehicle::{Preset, Synthesizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        let presets: Vec<&str> = Preset::ALL.iter().map(Preset::name).collect();
        bail!(
            "usage: decide_once <command> [preset] [seed]\npresets: {}",
            presets.join(", ")
        );
    };
    let preset = args
        .next()
        .map(|name| name.parse::<Preset>())
        .transpose()?;
    let mut rng = match args.next() {
        Some(seed) => StdRng::seed_from_u64(
            seed.parse()
                .with_context(|| format!("seed {seed:?} is not an integer"))?,
        ),
        None => StdRng::from_entropy(),
    };

    let synthesizer = Synthesizer::new()?;
    let mut state = synthesizer.synthesize(&mut rng);
    if let Some(preset) = preset {
        state = synthesizer.synthesize_from(&state, &preset.patch())?;
    }

    let decision = PolicyEngine::new().decide_checked(&command, &state.context())?;
    let out = json!({ "state": state, "decision": decision });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
