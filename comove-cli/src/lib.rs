//! # Comove CLI
//! File-system collaborators around the `comove` engine: roster and daily-bar loading,
//! grid and best-match writing, and environment settings.

/// Loader and writer errors.
pub mod error;

/// Roster and daily-bar loading.
pub mod loader;

/// Environment-driven settings.
pub mod settings;

/// Grid and best-match output.
pub mod writer;

/// Initialise an INFO `Subscriber` for `Tracing` logs and install it as the global default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        // Filter messages based on the INFO
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        // Install this Tracing subscriber as global default
        .init()
}
