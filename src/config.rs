use super::*;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Credentials {
  pub(crate) email: String,
  pub(crate) password: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Config {
  pub(crate) anon_key: String,
  pub(crate) credentials: Option<Credentials>,
  pub(crate) log_file: PathBuf,
  pub(crate) log_filter: String,
  pub(crate) orphans: OrphanPolicy,
  pub(crate) session_file: PathBuf,
  pub(crate) supabase_url: String,
}

impl Config {
  fn config_dir(lookup: &impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let base_dir = if let Some(dir) = lookup("XDG_CONFIG_HOME") {
      PathBuf::from(dir)
    } else if let Some(home) = lookup("HOME") {
      PathBuf::from(home).join(".config")
    } else {
      env::current_dir()?.join(".config")
    };

    Ok(base_dir.join("agora"))
  }

  pub(crate) fn from_env() -> Result<Self> {
    Self::from_lookup(|key| {
      env::var(key).ok().filter(|value| !value.is_empty())
    })
  }

  pub(crate) fn from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Self> {
    let required = |key: &str| {
      lookup(key)
        .ok_or_else(|| anyhow!("environment variable {key} is not set"))
    };

    let supabase_url = required("AGORA_SUPABASE_URL")?
      .trim_end_matches('/')
      .to_string();

    let anon_key = required("AGORA_SUPABASE_ANON_KEY")?;

    let credentials = match (lookup("AGORA_EMAIL"), lookup("AGORA_PASSWORD")) {
      (Some(email), Some(password)) => Some(Credentials { email, password }),
      (Some(_), None) => bail!("AGORA_EMAIL is set but AGORA_PASSWORD is not"),
      (None, Some(_)) => bail!("AGORA_PASSWORD is set but AGORA_EMAIL is not"),
      (None, None) => None,
    };

    let session_file = match lookup("AGORA_SESSION_FILE") {
      Some(path) => PathBuf::from(path),
      None => Self::config_dir(&lookup)?.join("session.json"),
    };

    let log_file = match lookup("AGORA_LOG_FILE") {
      Some(path) => PathBuf::from(path),
      None => session_file
        .parent()
        .map_or_else(
          || PathBuf::from("agora.log"),
          |dir| dir.join("agora.log"),
        ),
    };

    let orphans = lookup("AGORA_ORPHANS")
      .map(|value| value.parse::<OrphanPolicy>())
      .transpose()
      .context("invalid AGORA_ORPHANS")?
      .unwrap_or_default();

    Ok(Self {
      anon_key,
      credentials,
      log_file,
      log_filter: lookup("AGORA_LOG").unwrap_or_else(|| "info".to_string()),
      orphans,
      session_file,
      supabase_url,
    })
  }
}
