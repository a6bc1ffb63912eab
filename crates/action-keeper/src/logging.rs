use crate::config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` replaces the base level when set; `module_filters` are added on
/// top either way. Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(config)?;
    let subscriber = tracing_subscriber::registry();

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_line_number(true)
                .with_file(true);

            if let Some(file_path) = &config.file_output {
                let file = open_log_file(file_path)?;
                let file_layer = fmt::layer().json().with_writer(file).with_ansi(false);
                subscriber.with(filter).with(json_layer).with(file_layer).try_init()?;
            } else {
                subscriber.with(filter).with(json_layer).try_init()?;
            }
        }
        "compact" => {
            let compact_layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_line_number(false)
                .with_file(false);

            if let Some(file_path) = &config.file_output {
                let file = open_log_file(file_path)?;
                let file_layer = fmt::layer().compact().with_writer(file).with_ansi(false);
                subscriber.with(filter).with(compact_layer).with(file_layer).try_init()?;
            } else {
                subscriber.with(filter).with(compact_layer).try_init()?;
            }
        }
        _ => {
            // Source locations only at debug and below
            let show_location = matches!(config.level.as_str(), "debug" | "trace");
            let pretty_layer = fmt::layer()
                .with_target(show_location)
                .with_line_number(show_location)
                .with_file(show_location);

            if let Some(file_path) = &config.file_output {
                let file = open_log_file(file_path)?;
                let file_layer = fmt::layer().with_writer(file).with_ansi(false);
                subscriber.with(filter).with(pretty_layer).with(file_layer).try_init()?;
            } else {
                subscriber.with(filter).with(pretty_layer).try_init()?;
            }
        }
    }

    Ok(())
}

/// Base directive covers every `action_*` crate
pub fn build_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    let base = std::env::var("RUST_LOG").unwrap_or_else(|_| format!("action={}", config.level));
    let mut filter = EnvFilter::try_new(base)?;
    for (module, level) in &config.module_filters {
        filter = filter.add_directive(format!("{}={}", module, level).parse()?);
    }
    Ok(filter)
}

fn open_log_file(path: &std::path::Path) -> anyhow::Result<std::fs::File> {
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}
