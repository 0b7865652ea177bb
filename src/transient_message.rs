use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
  Error,
  Info,
}

/// A status-line message that reverts to `original` after a few seconds.
#[derive(Clone)]
pub(crate) struct TransientMessage {
  current: String,
  expires_at: Instant,
  original: String,
  tone: Tone,
}

impl TransientMessage {
  const ERROR_TTL: Duration = Duration::from_secs(6);
  const INFO_TTL: Duration = Duration::from_secs(3);

  pub(crate) fn current(&self) -> &str {
    &self.current
  }

  pub(crate) fn is_expired(&self) -> bool {
    Instant::now() >= self.expires_at
  }

  pub(crate) fn new(current: String, original: String, tone: Tone) -> Self {
    let ttl = match tone {
      Tone::Error => Self::ERROR_TTL,
      Tone::Info => Self::INFO_TTL,
    };

    Self {
      current,
      expires_at: Instant::now() + ttl,
      original,
      tone,
    }
  }

  pub(crate) fn original(&self) -> &str {
    &self.original
  }

  pub(crate) fn tone(&self) -> Tone {
    self.tone
  }
}
