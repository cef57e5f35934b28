use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;
use std::path::Path;

/// Initializes the global logger.
///
/// This should be called once, early in `main`, after configuration has been
/// loaded. Log level is controlled by the `RUST_LOG` environment variable if
/// set, otherwise by `level`. Logs go to both the console (colored) and
/// `log_file_path`.
pub fn init(level: LevelFilter, log_file_path: &Path) {
    if let Some(parent) = log_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory at '{}': {}", parent.display(), e);
            }
        }
    }

    let level_filter = std::env::var("RUST_LOG").ok().and_then(|v| v.parse::<LevelFilter>().ok()).unwrap_or(level);

    let base_config = Dispatch::new().level(level_filter).level_for("tokio_util", LevelFilter::Warn).level_for("actix", LevelFilter::Warn);

    let console_config = Dispatch::new()
        .format(|out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let file_config = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {} {}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.target(), message))
        })
        .chain(fern::log_file(log_file_path).unwrap_or_else(|e| {
            eprintln!("Failed to open log file '{}': {}", log_file_path.display(), e);
            fern::log_file("/dev/stderr").expect("stderr must always be openable as a log sink")
        }));

    base_config.chain(console_config).chain(file_config).apply().unwrap_or_else(|e| {
        eprintln!("Failed to apply logger configuration: {}", e);
    });

    log::info!("Logger initialized at level {:?}, writing to '{}'.", level_filter, log_file_path.display());
}
