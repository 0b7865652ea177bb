use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
  Community,
  Post,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ListEntry {
  pub(crate) detail: Option<String>,
  pub(crate) id: i64,
  pub(crate) kind: EntryKind,
  pub(crate) link: Option<String>,
  pub(crate) title: String,
}

impl From<Community> for ListEntry {
  fn from(community: Community) -> Self {
    let detail = community
      .description
      .as_deref()
      .map(str::trim)
      .filter(|description| !description.is_empty())
      .map(|description| truncate(description, 120));

    Self {
      detail,
      id: community.id,
      kind: EntryKind::Community,
      link: None,
      title: community.name,
    }
  }
}

impl From<Post> for ListEntry {
  fn from(post: Post) -> Self {
    let mut parts = Vec::new();

    if let Some(likes) = post.like_count {
      parts.push(format_count(likes, "like"));
    }

    if let Some(comments) = post.comment_count {
      parts.push(format_count(comments, "comment"));
    }

    if let Some(name) = post.community_name() {
      parts.push(format!("in {name}"));
    }

    parts.push(format_timestamp(&post.created_at));

    Self {
      detail: Some(parts.join(" • ")),
      id: post.id,
      kind: EntryKind::Post,
      link: post.image_link().map(str::to_string),
      title: post.title,
    }
  }
}
