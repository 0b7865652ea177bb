//! Rebuilds a post's comment forest from the flat, creation-ordered rows the
//! backend returns.

use super::*;

/// What to do with a comment whose parent is not in the fetched set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum OrphanPolicy {
  #[default]
  Drop,
  Promote,
}

impl FromStr for OrphanPolicy {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "drop" => Ok(Self::Drop),
      "promote" => Ok(Self::Promote),
      other => {
        bail!("unknown orphan policy `{other}`, expected drop or promote")
      }
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CommentNode {
  pub(crate) children: Vec<CommentNode>,
  pub(crate) comment: Comment,
}

impl CommentNode {
  pub(crate) fn id(&self) -> i64 {
    self.comment.id
  }
}

/// Builds the comment forest in two linear passes.
///
/// Roots and every sibling group keep the relative order of `comments`.
/// If an id occurs more than once, the last occurrence wins. Comments that
/// only reach each other through a parent cycle are never emitted.
pub(crate) fn build(
  comments: Vec<Comment>,
  orphans: OrphanPolicy,
) -> Vec<CommentNode> {
  let slots = comments
    .iter()
    .enumerate()
    .map(|(index, comment)| (comment.id, index))
    .collect::<HashMap<i64, usize>>();

  let mut children = vec![Vec::new(); comments.len()];
  let mut roots = Vec::new();

  for (index, comment) in comments.iter().enumerate() {
    if slots.get(&comment.id) != Some(&index) {
      continue;
    }

    match comment.parent_comment_id {
      None => roots.push(index),
      Some(parent) => match slots.get(&parent) {
        Some(&parent_index) => children[parent_index].push(index),
        None if orphans == OrphanPolicy::Promote => roots.push(index),
        None => {}
      },
    }
  }

  // Pre-order from the roots; reversing it guarantees every child is
  // assembled before its parent.
  let mut order = Vec::with_capacity(comments.len());
  let mut stack = roots.iter().rev().copied().collect::<Vec<_>>();

  while let Some(index) = stack.pop() {
    order.push(index);
    stack.extend(children[index].iter().rev().copied());
  }

  let mut comments = comments.into_iter().map(Some).collect::<Vec<_>>();
  let mut nodes: Vec<Option<CommentNode>> = vec![None; comments.len()];

  for &index in order.iter().rev() {
    let Some(comment) = comments[index].take() else {
      continue;
    };

    let children = children[index]
      .iter()
      .filter_map(|&child| nodes[child].take())
      .collect();

    nodes[index] = Some(CommentNode { children, comment });
  }

  roots
    .into_iter()
    .filter_map(|index| nodes[index].take())
    .collect()
}
