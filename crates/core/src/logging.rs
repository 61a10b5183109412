use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the global subscriber. Later calls are ignored, so every test binary
/// can call this from its entry point.
pub fn init_logging(verbosity: u8) {
	// 0 = warnings from the suite only, driver traffic silent
	// 1 = info for the suite (fixtures, navigation), warn for the runtime
	// 2+ = debug everywhere, including protocol frames
	let filter = match verbosity {
		0 => "warn,shop_runtime=off",
		1 => "info,shop_runtime=warn",
		_ => "debug",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	let _ = tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.try_init();
}

/// Verbosity from `SHOPTODO_VERBOSE` (a number), defaulting to 0.
pub fn verbosity_from_env() -> u8 {
	std::env::var("SHOPTODO_VERBOSE").ok().and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
