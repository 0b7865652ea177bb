use super::*;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct Comment {
  pub(crate) author: String,
  pub(crate) content: String,
  pub(crate) created_at: DateTime<Utc>,
  pub(crate) id: i64,
  pub(crate) parent_comment_id: Option<i64>,
  pub(crate) post_id: i64,
  #[serde(default)]
  pub(crate) user_id: Option<String>,
}

/// Insert payload for the `comments` table.
#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
  pub(crate) author: &'a str,
  pub(crate) content: &'a str,
  pub(crate) parent_comment_id: Option<i64>,
  pub(crate) post_id: i64,
  pub(crate) user_id: &'a str,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserializes_backend_row() {
    let comment = serde_json::from_str::<Comment>(
      r#"{
        "id": 7,
        "author": "ada",
        "user_id": "2b1c",
        "parent_comment_id": null,
        "content": "first!",
        "post_id": 3,
        "created_at": "2025-03-01T10:15:00.123456+00:00"
      }"#,
    )
    .unwrap();

    assert_eq!(comment.id, 7);
    assert_eq!(comment.parent_comment_id, None);
    assert_eq!(comment.user_id.as_deref(), Some("2b1c"));
    assert_eq!(
      comment.created_at.to_rfc3339(),
      "2025-03-01T10:15:00.123456+00:00"
    );
  }

  #[test]
  fn new_comment_serializes_null_parent() {
    let value = serde_json::to_value(NewComment {
      author: "ada",
      content: "hello",
      parent_comment_id: None,
      post_id: 3,
      user_id: "2b1c",
    })
    .unwrap();

    assert_eq!(value["parent_comment_id"], Value::Null);
    assert_eq!(value["post_id"], 3);
  }
}
