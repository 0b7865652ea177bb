use super::*;

/// Seconds before expiry at which a session is refreshed.
const REFRESH_MARGIN: i64 = 60;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub(crate) struct UserMetadata {
  #[serde(default)]
  pub(crate) avatar_url: Option<String>,
  #[serde(default)]
  pub(crate) user_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct User {
  #[serde(default)]
  pub(crate) email: Option<String>,
  pub(crate) id: String,
  #[serde(default)]
  pub(crate) user_metadata: UserMetadata,
}

impl User {
  pub(crate) fn display_name(&self) -> Option<&str> {
    self
      .user_metadata
      .user_name
      .as_deref()
      .filter(|name| !name.is_empty())
      .or(self.email.as_deref().filter(|email| !email.is_empty()))
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Session {
  pub(crate) access_token: String,
  #[serde(default)]
  pub(crate) expires_at: Option<i64>,
  #[serde(default)]
  pub(crate) expires_in: Option<i64>,
  pub(crate) refresh_token: String,
  pub(crate) user: User,
}

impl Session {
  /// Fills in `expires_at` from `expires_in` when the token endpoint only
  /// reported the latter.
  pub(crate) fn anchored(mut self, now: i64) -> Self {
    if self.expires_at.is_none() {
      self.expires_at = self.expires_in.map(|seconds| now + seconds);
    }

    self
  }

  pub(crate) fn needs_refresh(&self, now: i64) -> bool {
    self
      .expires_at
      .is_some_and(|expires_at| expires_at - REFRESH_MARGIN <= now)
  }
}

#[derive(Clone, Debug)]
pub(crate) struct SessionStore {
  path: PathBuf,
}

impl SessionStore {
  pub(crate) fn clear(&self) -> Result {
    match fs::remove_file(&self.path) {
      Err(error) if error.kind() != io::ErrorKind::NotFound => {
        Err(error.into())
      }
      _ => Ok(()),
    }
  }

  fn ensure_parent_dir(path: &Path) -> Result {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }

    Ok(())
  }

  pub(crate) fn load(&self) -> Result<Option<Session>> {
    if !self.path.exists() {
      return Ok(None);
    }

    let data = fs::read(&self.path)?;

    if data.is_empty() {
      return Ok(None);
    }

    Ok(Some(serde_json::from_slice::<Session>(&data).with_context(
      || format!("invalid session file {}", self.path.display()),
    )?))
  }

  pub(crate) fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub(crate) fn path(&self) -> &Path {
    &self.path
  }

  pub(crate) fn persist(&self, session: &Session) -> Result {
    Self::ensure_parent_dir(&self.path)?;

    fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;

    Ok(())
  }
}
