use super::*;

/// A post with everything its detail view shows.
#[derive(Clone, Debug)]
pub(crate) struct Thread {
  pub(crate) focus: Option<i64>,
  pub(crate) post: Post,
  pub(crate) roots: Vec<CommentNode>,
  pub(crate) votes: VoteSummary,
}
