//! Tracing bootstrap shared by the binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber. `RUST_LOG` is honoured; `verbose` raises the
/// planner crates to debug.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("skyroute_core={level}").parse()?)
                .add_directive(format!("skyroute_cli={level}").parse()?),
        )
        .try_init()?;
    Ok(())
}
