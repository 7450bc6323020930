//! Tracing subscriber setup for the `credhub` binary
//!
//! The filter comes from the `-v/-q` flags when given, otherwise from
//! `RUST_LOG`, otherwise from the default passed by the caller. Log lines go
//! to stderr so they never mix with JSON written to stdout.

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact stderr subscriber filtered by `verbosity`, falling back
/// to `RUST_LOG` and then to `default_filter`.
///
/// Fails if a global subscriber is already set or the filter does not parse.
///
/// ```no_run
/// use clap::Parser;
/// use clap_verbosity_flag::{OffLevel, Verbosity};
///
/// #[derive(Parser)]
/// struct Args {
///     #[command(flatten)]
///     verbosity: Verbosity<OffLevel>,
/// }
///
/// let args = Args::parse();
/// credhub_common::logging::init_logging(&args.verbosity, "credhub_sdk=debug").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = build_filter(verbosity, default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Like [`init_logging`], but does nothing unless a verbosity flag or
/// `RUST_LOG` asks for output. Returns whether a subscriber was installed.
pub fn init_cli_logging<L: LogLevel>(
    verbosity: &Verbosity<L>,
    default_filter: &str,
) -> Result<bool> {
    let requested = verbosity.log_level().is_some() || std::env::var_os("RUST_LOG").is_some();
    if !requested {
        return Ok(false);
    }
    init_logging(verbosity, default_filter)?;
    Ok(true)
}

fn build_filter<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<EnvFilter> {
    match verbosity.log_level() {
        Some(level) => Ok(EnvFilter::try_new(level.as_str())?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter))),
    }
}
