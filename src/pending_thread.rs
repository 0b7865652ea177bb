pub(crate) struct PendingThread {
  pub(crate) post_id: i64,
  pub(crate) request_id: u64,
}
