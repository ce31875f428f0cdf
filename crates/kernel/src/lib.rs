//! Marquee CMS Kernel Library
//!
//! The kernel owns storage, permissions, anti-forgery tokens and rendering,
//! and drives registered plugins through typed taps. Embedders assemble one
//! with [`Kernel::builder`].

pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod permissions;
pub mod plugin;
pub mod state;
pub mod tap;
pub mod theme;

pub use config::Config;
pub use error::{KernelError, KernelResult};
pub use state::{Kernel, KernelBuilder};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.log_filter`. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
