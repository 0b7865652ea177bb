use super::*;

/// A post's detail page: the post itself, its vote tally and the comment
/// forest flattened depth-first into collapsible entries.
pub(crate) struct CommentView {
  pub(crate) entries: Vec<CommentEntry>,
  pub(crate) offset: usize,
  pub(crate) post: Post,
  pub(crate) selected: Option<usize>,
  pub(crate) votes: VoteSummary,
}

impl CommentView {
  fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
    iter::successors(self.parent_of(idx), |&current| self.parent_of(current))
  }

  pub(crate) fn collapse_ids(&mut self, ids: &HashSet<i64>) {
    for entry in &mut self.entries {
      if entry.has_children() && ids.contains(&entry.id) {
        entry.expanded = false;
      }
    }

    self.ensure_selection_visible();
  }

  pub(crate) fn collapse_selected(&mut self) {
    let Some(entry) = self.selected.and_then(|idx| self.entries.get_mut(idx))
    else {
      return;
    };

    if entry.expanded && entry.has_children() {
      entry.expanded = false;
    } else if let Some(parent) = entry.parent {
      self.selected = Some(parent);
    }

    self.ensure_selection_visible();
  }

  pub(crate) fn collapsed_ids(&self) -> HashSet<i64> {
    self
      .entries
      .iter()
      .filter(|entry| !entry.expanded)
      .map(|entry| entry.id)
      .collect()
  }

  /// Moves a selection hidden under a collapsed comment up to its nearest
  /// visible ancestor.
  pub(crate) fn ensure_selection_visible(&mut self) {
    let Some(selected) = self.selected else {
      self.selected = self.visible_indexes().first().copied();
      return;
    };

    let next = iter::once(selected)
      .chain(self.ancestors(selected))
      .find(|&idx| self.is_visible(idx))
      .or_else(|| self.visible_indexes().first().copied());

    self.selected = next;
  }

  pub(crate) fn expand_selected(&mut self) {
    let Some(entry) = self.selected.and_then(|idx| self.entries.get_mut(idx))
    else {
      return;
    };

    if !entry.has_children() {
      return;
    }

    if entry.expanded {
      self.selected = entry.children.first().copied();
    } else {
      entry.expanded = true;
    }

    self.ensure_selection_visible();
  }

  pub(crate) fn image_link(&self) -> Option<&str> {
    self.post.image_link()
  }

  pub(crate) fn is_visible(&self, idx: usize) -> bool {
    self
      .ancestors(idx)
      .all(|ancestor| self.entries[ancestor].expanded)
  }

  fn move_by(&mut self, delta: isize) {
    let (visible, selected_pos) = self.visible_with_selection();

    let Some(max_index) = visible.len().checked_sub(1) else {
      self.selected = None;
      return;
    };

    let target = selected_pos
      .unwrap_or(0)
      .saturating_add_signed(delta)
      .min(max_index);

    self.selected = Some(visible[target]);
  }

  /// Flattens the forest depth-first with an explicit stack, so reply
  /// chains of any length are laid out without recursion.
  pub(crate) fn new(thread: Thread) -> Self {
    let Thread {
      focus,
      post,
      roots,
      votes,
    } = thread;

    let mut entries: Vec<CommentEntry> = Vec::new();
    let mut selected = None;

    let mut stack = roots
      .into_iter()
      .rev()
      .map(|node| (node, None, 0))
      .collect::<Vec<(CommentNode, Option<usize>, usize)>>();

    while let Some((node, parent, depth)) = stack.pop() {
      let idx = entries.len();

      if selected.is_none() && focus == Some(node.id()) {
        selected = Some(idx);
      }

      if let Some(parent) = parent {
        entries[parent].children.push(idx);
      }

      let CommentNode { children, comment } = node;

      entries.push(CommentEntry {
        author: comment.author,
        body: comment.content,
        children: Vec::new(),
        created_at: comment.created_at,
        depth,
        expanded: true,
        id: comment.id,
        parent,
      });

      stack.extend(
        children
          .into_iter()
          .rev()
          .map(|child| (child, Some(idx), depth.saturating_add(1))),
      );
    }

    if selected.is_none() && !entries.is_empty() {
      selected = Some(0);
    }

    Self {
      entries,
      offset: 0,
      post,
      selected,
      votes,
    }
  }

  pub(crate) fn page_down(&mut self, amount: usize) {
    self.move_by(Self::page_step(amount));
  }

  fn page_step(amount: usize) -> isize {
    isize::try_from(amount.saturating_sub(1).max(1)).unwrap_or(isize::MAX)
  }

  pub(crate) fn page_up(&mut self, amount: usize) {
    self.move_by(-Self::page_step(amount));
  }

  fn parent_of(&self, idx: usize) -> Option<usize> {
    self.entries.get(idx).and_then(|entry| entry.parent)
  }

  pub(crate) fn post_id(&self) -> i64 {
    self.post.id
  }

  pub(crate) fn select_index_at(&mut self, pos: usize) {
    let visible = self.visible_indexes();

    self.selected = visible
      .get(pos)
      .or_else(|| visible.last())
      .copied();
  }

  pub(crate) fn select_next(&mut self) {
    self.move_by(1);
  }

  pub(crate) fn select_previous(&mut self) {
    self.move_by(-1);
  }

  pub(crate) fn selected_entry(&self) -> Option<&CommentEntry> {
    self.selected.and_then(|idx| self.entries.get(idx))
  }

  pub(crate) fn toggle_selected(&mut self) {
    if let Some(entry) = self.selected.and_then(|idx| self.entries.get_mut(idx))
      && entry.has_children()
    {
      entry.expanded = !entry.expanded;
    }

    self.ensure_selection_visible();
  }

  /// Entries not hidden under a collapsed ancestor, in display order. Each
  /// subtree is contiguous in `entries`, so one pass skipping by depth is
  /// enough.
  pub(crate) fn visible_indexes(&self) -> Vec<usize> {
    let mut visible = Vec::with_capacity(self.entries.len());
    let mut hidden_below = None;

    for (idx, entry) in self.entries.iter().enumerate() {
      if let Some(depth) = hidden_below {
        if entry.depth > depth {
          continue;
        }

        hidden_below = None;
      }

      visible.push(idx);

      if !entry.expanded && entry.has_children() {
        hidden_below = Some(entry.depth);
      }
    }

    visible
  }

  pub(crate) fn visible_with_selection(&self) -> (Vec<usize>, Option<usize>) {
    let visible = self.visible_indexes();

    let selected_pos = self
      .selected
      .and_then(|selected| visible.iter().position(|&idx| idx == selected));

    (visible, selected_pos)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_comment(id: i64, parent: Option<i64>) -> Comment {
    Comment {
      author: format!("user{id}"),
      content: format!("comment {id}"),
      created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
      id,
      parent_comment_id: parent,
      post_id: 1,
      user_id: None,
    }
  }

  fn sample_post() -> Post {
    Post {
      avatar_url: None,
      comment_count: None,
      communities: None,
      community_id: None,
      content: "post body".to_string(),
      created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
      id: 1,
      image_url: Some("https://cdn.example.com/1.png".to_string()),
      like_count: None,
      title: "A post".to_string(),
    }
  }

  fn make_view(focus: Option<i64>) -> CommentView {
    let roots = comment_tree::build(
      vec![
        make_comment(1, None),
        make_comment(2, Some(1)),
        make_comment(3, None),
      ],
      OrphanPolicy::Drop,
    );

    CommentView::new(Thread {
      focus,
      post: sample_post(),
      roots,
      votes: VoteSummary::default(),
    })
  }

  #[test]
  fn new_flattens_forest_depth_first() {
    let view = make_view(None);

    let flattened = view
      .entries
      .iter()
      .map(|entry| (entry.id, entry.depth, entry.parent))
      .collect::<Vec<_>>();

    assert_eq!(flattened, vec![(1, 0, None), (2, 1, Some(0)), (3, 0, None)]);
    assert_eq!(view.entries[0].children, vec![1]);
    assert_eq!(view.selected, Some(0));
  }

  #[test]
  fn new_selects_focused_comment_when_present() {
    let view = make_view(Some(2));
    assert_eq!(view.selected, Some(1));
    assert_eq!(view.image_link(), Some("https://cdn.example.com/1.png"));
  }

  #[test]
  fn empty_thread_has_no_selection() {
    let view = CommentView::new(Thread {
      focus: None,
      post: sample_post(),
      roots: Vec::new(),
      votes: VoteSummary::default(),
    });

    assert_eq!(view.selected, None);
    assert!(view.selected_entry().is_none());
  }

  #[test]
  fn toggle_selected_collapses_and_expands_comments() {
    let mut view = make_view(None);
    assert!(view.entries[0].expanded);

    view.toggle_selected();
    assert!(!view.entries[0].expanded);
    assert!(view.entries[0].header().ends_with(" • 1 reply hidden"));

    view.toggle_selected();
    assert!(view.entries[0].expanded);
  }

  #[test]
  fn collapse_selected_moves_to_parent_when_child_selected() {
    let mut view = make_view(None);
    view.select_index_at(1);
    assert_eq!(view.selected, Some(1));
    view.collapse_selected();
    assert_eq!(view.selected, Some(0));
  }

  #[test]
  fn expand_selected_moves_into_first_child() {
    let mut view = make_view(None);
    view.expand_selected();
    assert_eq!(view.selected, Some(1));
  }

  #[test]
  fn ensure_selection_visible_promotes_hidden_selection() {
    let mut view = make_view(None);
    view.select_index_at(1);
    view.entries[0].expanded = false;
    view.ensure_selection_visible();
    assert_eq!(view.selected, Some(0));
  }

  #[test]
  fn visible_indexes_respect_collapsed_ancestors() {
    let mut view = make_view(None);
    assert_eq!(view.visible_indexes(), vec![0, 1, 2]);
    view.entries[0].expanded = false;
    assert_eq!(view.visible_indexes(), vec![0, 2]);
  }

  #[test]
  fn select_next_skips_hidden_replies() {
    let mut view = make_view(None);
    view.toggle_selected();
    view.select_next();
    assert_eq!(view.selected_entry().map(|entry| entry.id), Some(3));
  }

  #[test]
  fn collapsed_ids_survive_a_rebuild() {
    let mut view = make_view(None);
    view.toggle_selected();

    let collapsed = view.collapsed_ids();
    assert_eq!(collapsed, HashSet::from([1]));

    let mut rebuilt = make_view(Some(2));
    rebuilt.collapse_ids(&collapsed);

    assert!(!rebuilt.entries[0].expanded);
    assert_eq!(rebuilt.selected, Some(0));
  }

  #[test]
  fn deep_reply_chains_flatten_and_collapse() {
    let comments = (1..=2_000)
      .map(|id| make_comment(id, (id > 1).then_some(id - 1)))
      .collect();

    let mut view = CommentView::new(Thread {
      focus: Some(2_000),
      post: sample_post(),
      roots: comment_tree::build(comments, OrphanPolicy::Drop),
      votes: VoteSummary::default(),
    });

    assert_eq!(view.entries.len(), 2_000);
    assert_eq!(view.entries[1_999].depth, 1_999);
    assert_eq!(view.selected, Some(1_999));

    view.entries[0].expanded = false;
    view.ensure_selection_visible();

    assert_eq!(view.visible_indexes(), vec![0]);
    assert_eq!(view.selected, Some(0));
  }

  #[test]
  fn paging_clamps_to_visible_range() {
    let mut view = make_view(None);

    view.page_down(10);
    assert_eq!(view.selected_entry().map(|entry| entry.id), Some(3));

    view.page_up(10);
    assert_eq!(view.selected_entry().map(|entry| entry.id), Some(1));
  }
}
