use super::*;

/// Routes `tracing` events to `config.log_file`; the terminal belongs to the
/// UI for the whole session.
pub(crate) fn init(config: &Config) -> Result {
  if let Some(parent) = config.log_file.parent() {
    fs::create_dir_all(parent)?;
  }

  let file = fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&config.log_file)
    .with_context(|| {
      format!("could not open log file {}", config.log_file.display())
    })?;

  let filter = EnvFilter::try_new(&config.log_filter).with_context(|| {
    format!("invalid AGORA_LOG filter `{}`", config.log_filter)
  })?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .try_init()
    .map_err(|error| anyhow!(error))?;

  Ok(())
}
