use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "comfypack=warn";

/// Filter used with `--verbose`
const VERBOSE_FILTER: &str = "comfypack=debug";

/// Initialize logging to stderr
///
/// The level can be controlled via the RUST_LOG environment variable, which
/// takes precedence over `--verbose`:
/// - RUST_LOG=comfypack=debug comfypack pack flow.json
/// - RUST_LOG=comfypack=info comfypack fetch
///
/// Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
