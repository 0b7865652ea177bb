use super::*;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct CommunityName {
  pub(crate) name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct Post {
  #[serde(default)]
  pub(crate) avatar_url: Option<String>,
  #[serde(default)]
  pub(crate) comment_count: Option<u64>,
  #[serde(default)]
  pub(crate) communities: Option<CommunityName>,
  #[serde(default)]
  pub(crate) community_id: Option<i64>,
  #[serde(default)]
  pub(crate) content: String,
  pub(crate) created_at: DateTime<Utc>,
  pub(crate) id: i64,
  #[serde(default)]
  pub(crate) image_url: Option<String>,
  #[serde(default)]
  pub(crate) like_count: Option<u64>,
  pub(crate) title: String,
}

/// Insert payload for the `posts` table.
#[derive(Debug, Serialize)]
pub(crate) struct NewPost<'a> {
  pub(crate) avatar_url: Option<&'a str>,
  pub(crate) community_id: Option<i64>,
  pub(crate) content: &'a str,
  pub(crate) image_url: &'a str,
  pub(crate) title: &'a str,
}

/// A post waiting to be created, as gathered by the composer.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PostDraft {
  pub(crate) community_id: Option<i64>,
  pub(crate) content: String,
  pub(crate) image_path: PathBuf,
  pub(crate) title: String,
}

impl Post {
  pub(crate) fn community_name(&self) -> Option<&str> {
    self
      .communities
      .as_ref()
      .map(|community| community.name.as_str())
  }

  pub(crate) fn image_link(&self) -> Option<&str> {
    self.image_url.as_deref().filter(|url| !url.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserializes_counted_post_from_rpc() {
    let post = serde_json::from_str::<Post>(
      r#"{
        "id": 12,
        "title": "Hello",
        "content": "World",
        "created_at": "2025-01-02T03:04:05+00:00",
        "image_url": "https://cdn.example.com/a.png",
        "avatar_url": null,
        "like_count": 4,
        "comment_count": 2
      }"#,
    )
    .unwrap();

    assert_eq!(post.like_count, Some(4));
    assert_eq!(post.comment_count, Some(2));
    assert_eq!(post.community_name(), None);
    assert_eq!(post.image_link(), Some("https://cdn.example.com/a.png"));
  }

  #[test]
  fn deserializes_embedded_community_name() {
    let post = serde_json::from_str::<Post>(
      r#"{
        "id": 3,
        "title": "Rust",
        "content": "",
        "created_at": "2025-01-02T03:04:05Z",
        "image_url": "",
        "community_id": 9,
        "communities": { "name": "rustaceans" }
      }"#,
    )
    .unwrap();

    assert_eq!(post.community_id, Some(9));
    assert_eq!(post.community_name(), Some("rustaceans"));
    assert_eq!(post.image_link(), None);
  }
}
