use super::*;

pub(crate) const DISLIKE: i8 = -1;
pub(crate) const LIKE: i8 = 1;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct Vote {
  pub(crate) id: i64,
  pub(crate) post_id: i64,
  pub(crate) user_id: String,
  pub(crate) vote: i8,
}

/// Insert payload for the `votes` table.
#[derive(Debug, Serialize)]
pub(crate) struct NewVote<'a> {
  pub(crate) post_id: i64,
  pub(crate) user_id: &'a str,
  pub(crate) vote: i8,
}

/// The write that casting `value` turns into, given the viewer's current
/// vote on the post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VoteChange {
  Delete { id: i64 },
  Insert { vote: i8 },
  Update { id: i64, vote: i8 },
}

impl VoteChange {
  pub(crate) fn describe(self) -> &'static str {
    match self {
      Self::Delete { .. } => "Vote removed",
      Self::Insert { vote } | Self::Update { vote, .. } if vote == LIKE => {
        "Liked"
      }
      Self::Insert { .. } | Self::Update { .. } => "Disliked",
    }
  }

  pub(crate) fn resolve(existing: Option<&Vote>, value: i8) -> Self {
    match existing {
      None => Self::Insert { vote: value },
      Some(vote) if vote.vote == value => Self::Delete { id: vote.id },
      Some(vote) => Self::Update {
        id: vote.id,
        vote: value,
      },
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct VoteSummary {
  pub(crate) dislikes: usize,
  pub(crate) likes: usize,
  pub(crate) viewer_vote: Option<i8>,
}

impl VoteSummary {
  pub(crate) fn tally(votes: &[Vote], viewer: Option<&str>) -> Self {
    Self {
      dislikes: votes.iter().filter(|vote| vote.vote == DISLIKE).count(),
      likes: votes.iter().filter(|vote| vote.vote == LIKE).count(),
      viewer_vote: viewer.and_then(|viewer| {
        votes
          .iter()
          .find(|vote| vote.user_id == viewer)
          .map(|vote| vote.vote)
      }),
    }
  }
}
