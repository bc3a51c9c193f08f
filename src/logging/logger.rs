use anyhow::Result;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Keeps the background log writer alive for the process lifetime
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

pub fn init_logger() -> Result<()> {
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "ahbot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Console and file output
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!("Logger initialized, writing to {:?}", log_dir);
    Ok(())
}

fn get_log_dir() -> PathBuf {
    // Use executable directory for log files
    // This allows multiple instances to run with separate logs
    match std::env::current_exe() {
        Ok(exe_path) => exe_path
            .parent()
            .map(|p| p.join("logs"))
            .unwrap_or_else(|| {
                eprintln!(
                    "Warning: Could not get parent directory of executable, using current directory"
                );
                PathBuf::from("logs")
            }),
        Err(e) => {
            eprintln!(
                "Warning: Could not get executable path ({}), using current directory",
                e
            );
            PathBuf::from("logs")
        }
    }
}
