use super::*;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
  CastVote {
    post_id: i64,
    value: i8,
  },
  CreateComment {
    content: String,
    parent_comment_id: Option<i64>,
    post_id: i64,
  },
  CreateCommunity {
    description: String,
    name: String,
  },
  CreatePost {
    draft: PostDraft,
  },
  FetchFeed {
    feed: Feed,
    offset: usize,
    tab_index: usize,
  },
  FetchThread {
    focus: Option<i64>,
    post_id: i64,
    request_id: u64,
  },
  FetchVotes {
    post_id: i64,
    request_id: u64,
  },
  OpenUrl {
    url: String,
  },
  SignOut,
}
