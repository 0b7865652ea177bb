use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ReplyTarget {
  pub(crate) author: String,
  pub(crate) id: i64,
}

/// What is being written, and the fields gathered so far.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Draft {
  Comment {
    post_id: i64,
    reply_to: Option<ReplyTarget>,
  },
  Community {
    name: Option<String>,
  },
  Post {
    community_id: Option<i64>,
    content: Option<String>,
    title: Option<String>,
  },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Submission {
  Comment {
    content: String,
    parent_comment_id: Option<i64>,
    post_id: i64,
  },
  Community {
    description: String,
    name: String,
  },
  Post(PostDraft),
}

pub(crate) struct Composer {
  pub(crate) buffer: String,
  draft: Draft,
  pub(crate) message_backup: String,
}

impl Composer {
  fn label(&self) -> String {
    match &self.draft {
      Draft::Comment { reply_to: None, .. } => "Comment".to_string(),
      Draft::Comment {
        reply_to: Some(target),
        ..
      } => format!("Reply to {}", target.author),
      Draft::Community { name: None } => "Community name".to_string(),
      Draft::Community { name: Some(_) } => "Description".to_string(),
      Draft::Post { title: None, .. } => "Post title".to_string(),
      Draft::Post { content: None, .. } => "Post content".to_string(),
      Draft::Post { .. } => "Image file".to_string(),
    }
  }

  pub(crate) fn new(draft: Draft, message_backup: String) -> Self {
    Self {
      buffer: String::new(),
      draft,
      message_backup,
    }
  }

  pub(crate) fn prompt(&self) -> String {
    format!("{}: {}", self.label(), self.buffer)
  }

  /// Consumes the current field. Returns the finished submission once every
  /// field is filled; until then the composer stays open on the next field.
  /// Blank input is rejected except for the optional community description.
  pub(crate) fn submit(&mut self) -> Option<Submission> {
    let value = self.buffer.trim().to_string();

    let optional = matches!(self.draft, Draft::Community { name: Some(_) });

    if value.is_empty() && !optional {
      return None;
    }

    self.buffer.clear();

    match &mut self.draft {
      Draft::Comment { post_id, reply_to } => Some(Submission::Comment {
        content: value,
        parent_comment_id: reply_to.as_ref().map(|target| target.id),
        post_id: *post_id,
      }),
      Draft::Community { name: name @ None } => {
        *name = Some(value);
        None
      }
      Draft::Community { name: Some(name) } => Some(Submission::Community {
        description: value,
        name: std::mem::take(name),
      }),
      Draft::Post { title: title @ None, .. } => {
        *title = Some(value);
        None
      }
      Draft::Post {
        content: content @ None,
        ..
      } => {
        *content = Some(value);
        None
      }
      Draft::Post {
        community_id,
        content,
        title,
      } => Some(Submission::Post(PostDraft {
        community_id: *community_id,
        content: content.take().unwrap_or_default(),
        image_path: expand_home(&value),
        title: title.take().unwrap_or_default(),
      })),
    }
  }
}

fn expand_home(path: &str) -> PathBuf {
  match (path.strip_prefix("~/"), env::var_os("HOME")) {
    (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => PathBuf::from(path),
  }
}
