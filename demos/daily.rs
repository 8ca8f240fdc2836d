use dailylog::{FileLogConfig, LogConfig, init_logging, log_error, log_line};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let log_path = temp_dir.path().join("daily.log");

    let file_config = FileLogConfig::new(log_path.clone())
        .with_append(true)
        .with_caller_file(true)
        .with_caller_function(true);
    let config = LogConfig::new().with_console(true).with_file(file_config);

    let logger = init_logging(&config, None)?.ok_or("file logging not configured")?;

    for i in 0..10 {
        log_line!(logger, "{}-{}", "evt", i)?;
    }
    log_error!(logger, "request {} failed", 42)?;
    tracing::info!("events from tracing land in the same file");

    println!("{}", std::fs::read_to_string(&log_path)?);
    Ok(())
}
