use super::*;

pub(crate) enum Event {
  CommentCreated {
    parent_comment_id: Option<i64>,
    post_id: i64,
    result: Result,
  },
  CommunityCreated {
    name: String,
    result: Result,
  },
  FeedItems {
    offset: usize,
    tab_index: usize,
    result: Result<Vec<ListEntry>>,
  },
  PostCreated {
    community_id: Option<i64>,
    result: Result,
  },
  SignedOut {
    result: Result,
  },
  Thread {
    request_id: u64,
    result: Result<Thread>,
  },
  VoteCast {
    post_id: i64,
    result: Result<VoteChange>,
  },
  Votes {
    post_id: i64,
    request_id: u64,
    result: Result<VoteSummary>,
  },
}
