use super::*;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct Community {
  pub(crate) created_at: DateTime<Utc>,
  #[serde(default)]
  pub(crate) description: Option<String>,
  pub(crate) id: i64,
  pub(crate) name: String,
}

/// Insert payload for the `communities` table.
#[derive(Debug, Serialize)]
pub(crate) struct NewCommunity<'a> {
  pub(crate) description: &'a str,
  pub(crate) name: &'a str,
}
