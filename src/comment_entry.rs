use super::*;

pub(crate) struct CommentEntry {
  pub(crate) author: String,
  pub(crate) body: String,
  pub(crate) children: Vec<usize>,
  pub(crate) created_at: DateTime<Utc>,
  pub(crate) depth: usize,
  pub(crate) expanded: bool,
  pub(crate) id: i64,
  pub(crate) parent: Option<usize>,
}

impl CommentEntry {
  pub(crate) fn body(&self) -> &str {
    self.body.as_str()
  }

  pub(crate) fn has_children(&self) -> bool {
    !self.children.is_empty()
  }

  pub(crate) fn header(&self) -> String {
    let author = if self.author.is_empty() {
      "unknown"
    } else {
      self.author.as_str()
    };

    let mut header =
      format!("{author} • {}", format_timestamp(&self.created_at));

    if !self.expanded {
      match self.children.len() {
        0 => {}
        1 => header.push_str(" • 1 reply hidden"),
        count => header.push_str(&format!(" • {count} replies hidden")),
      }
    }

    header
  }

  pub(crate) fn reply_target(&self) -> ReplyTarget {
    ReplyTarget {
      author: self.author.clone(),
      id: self.id,
    }
  }
}
