use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "paralympics_iris=info,tower_http=info";

/// Install the global tracing subscriber. `RUST_LOG` overrides `default_filter`.
/// Calling it twice is harmless; the second call is ignored.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init(DEFAULT_FILTER);
        init("debug");
        tracing::info!("logging initialised");
    }
}
