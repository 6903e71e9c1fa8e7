/*!
 * [crates/telemetry/src/lib.rs]
 * Tracing initialization shared by `apps/control-plane` and
 * `apps/worker-node`, grounded in the teacher's `heimdall` crate: dual
 * dev/prod formatting, a default filter that quiets noisy infra crates, and
 * a global panic hook that routes panic payloads through `tracing` before
 * the process dies.
 */

use std::panic;

use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber and panic hook for `service_name`.
///
/// In debug builds, logs are compact and human-readable. In release builds,
/// logs are flattened JSON suitable for ingestion by a log pipeline.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level},tower_http=warn,hyper=warn",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service_name = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");

        error!(target: "panic", service = %service_name, location = %location, "thread panicked: {payload}");
    }));

    info!(service = %service_name, "tracing initialized");
}
