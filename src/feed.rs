use super::*;

/// What a list tab shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Feed {
  Communities,
  Community { id: i64, name: String },
  Posts,
}

impl Feed {
  pub(crate) fn community_id(&self) -> Option<i64> {
    match self {
      Self::Community { id, .. } => Some(*id),
      Self::Communities | Self::Posts => None,
    }
  }

  pub(crate) fn defaults() -> Vec<Feed> {
    vec![Self::Posts, Self::Communities]
  }

  pub(crate) fn label(&self) -> String {
    match self {
      Self::Communities => "communities".to_string(),
      Self::Community { name, .. } => format!("c/{name}"),
      Self::Posts => "posts".to_string(),
    }
  }
}
