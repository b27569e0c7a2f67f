use grants_ytd::{config::PipelineConfig, error::YtdError, pipeline};
use std::process::exit;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config and run ──────────────────────────────────────
    let t0 = Instant::now();
    let result = PipelineConfig::load().and_then(|config| pipeline::run(&config));

    match result {
        Ok(out) => {
            info!(
                input = %out.input.display(),
                rows = out.rows_read,
                kept = out.records_kept,
                aggregates = out.aggregates.len(),
                elapsed = ?t0.elapsed(),
                "done"
            );
        }
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<YtdError>()
                .map(YtdError::exit_code)
                .unwrap_or(1);
            exit(code);
        }
    }
}
