use super::*;

pub(crate) struct Tab {
  pub(crate) feed: Feed,
  pub(crate) has_more: bool,
  pub(crate) label: String,
}

impl Tab {
  pub(crate) fn new(feed: Feed) -> Self {
    Self {
      has_more: true,
      label: feed.label(),
      feed,
    }
  }
}
