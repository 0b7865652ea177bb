use super::*;

pub(crate) struct State {
  active_tab: usize,
  composer: Option<Composer>,
  help: HelpView,
  list_height: usize,
  message: String,
  mode: Mode,
  next_request_id: u64,
  pending_effects: Vec<Effect>,
  pending_selections: Vec<Option<usize>>,
  pending_thread: Option<PendingThread>,
  tab_loading: Vec<bool>,
  tab_views: Vec<Option<ListView<ListEntry>>>,
  tabs: Vec<Tab>,
  transient_message: Option<TransientMessage>,
  viewer: Option<User>,
  vote_in_flight: bool,
  votes_request_id: Option<u64>,
}

impl State {
  fn cancel_compose(&mut self) {
    if let Some(composer) = self.composer.take() {
      self.message = composer.message_backup;
    }
  }

  fn close_thread(&mut self) {
    self.pending_thread = None;
    self.transient_message = None;

    self.restore_active_list_view();

    self.settle_message();
  }

  fn compose(&mut self, draft: Draft) {
    if self.composer.is_some() {
      return;
    }

    let backup = self.message.clone();

    self.composer = Some(Composer::new(draft, backup));

    self.update_compose_message();
  }

  fn compose_comment(&mut self) {
    let Mode::Thread(view) = &self.mode else {
      return;
    };

    let post_id = view.post_id();

    if self.require_viewer("You must be logged in to comment") {
      self.compose(Draft::Comment {
        post_id,
        reply_to: None,
      });
    }
  }

  fn compose_community(&mut self) {
    self.compose(Draft::Community { name: None });
  }

  pub(crate) fn compose_input_command(
    &mut self,
    key: KeyEvent,
  ) -> Option<Command> {
    if self.composer.is_some() {
      Some(self.handle_compose_key(key))
    } else {
      None
    }
  }

  fn compose_post(&mut self) {
    if !matches!(self.mode, Mode::List(_)) {
      return;
    }

    let community_id = self
      .resolved_active_tab()
      .and_then(|index| self.tabs.get(index))
      .and_then(|tab| tab.feed.community_id());

    if self.require_viewer("You must be logged in to post") {
      self.compose(Draft::Post {
        community_id,
        content: None,
        title: None,
      });
    }
  }

  fn compose_reply(&mut self) {
    let Mode::Thread(view) = &self.mode else {
      return;
    };

    let post_id = view.post_id();

    let Some(target) = view.selected_entry().map(CommentEntry::reply_target)
    else {
      self.set_transient_message(
        "Select a comment to reply to".into(),
        Tone::Info,
      );
      return;
    };

    if self.require_viewer("You must be logged in to reply") {
      self.compose(Draft::Comment {
        post_id,
        reply_to: Some(target),
      });
    }
  }

  fn current_entry(&self) -> Option<&ListEntry> {
    self
      .list_view(self.active_tab)
      .and_then(|view| view.selected_item())
  }

  pub(crate) fn dispatch_command(
    &mut self,
    command: Command,
  ) -> CommandDispatch {
    debug_assert!(
      self.pending_effects.is_empty(),
      "command dispatch should start without pending effects"
    );

    let mut should_exit = false;

    match command {
      Command::Quit => {
        should_exit = true;
      }
      Command::ShowHelp => self.help.show(&mut self.message),
      Command::HideHelp => self.help.hide(&mut self.message),
      Command::CancelCompose => self.cancel_compose(),
      Command::SubmitCompose => self.submit_compose(),
      Command::ComposeComment => self.compose_comment(),
      Command::ComposeCommunity => self.compose_community(),
      Command::ComposePost => self.compose_post(),
      Command::ComposeReply => self.compose_reply(),
      Command::Like => self.vote(LIKE),
      Command::Dislike => self.vote(DISLIKE),
      Command::SwitchTabLeft => self.switch_tab_left(),
      Command::SwitchTabRight => self.switch_tab_right(),
      Command::SelectNext => self.select_next(),
      Command::SelectPrevious => self.select_previous(),
      Command::PageDown => self.page_down(),
      Command::PageUp => self.page_up(),
      Command::SelectFirst => self.select_index(0),
      Command::OpenSelected => self.open_selected(),
      Command::OpenImage => self.open_image(),
      Command::Refresh => self.refresh_active_tab(),
      Command::SignOut => self.sign_out(),
      Command::CloseThread => self.close_thread(),
      Command::None => {}
    }

    CommandDispatch {
      effects: std::mem::take(&mut self.pending_effects),
      should_exit,
    }
  }

  fn ensure_community_tab(&mut self, id: i64, name: String) -> usize {
    if let Some(index) = self
      .tabs
      .iter()
      .position(|tab| tab.feed.community_id() == Some(id))
    {
      return index;
    }

    let tab_index = self.tabs.len();

    self.tabs.push(Tab::new(Feed::Community { id, name }));
    self.tab_views.push(Some(ListView::default()));
    self.tab_loading.push(false);
    self.pending_selections.push(None);

    self.fetch_tab(tab_index, 0);

    tab_index
  }

  fn ensure_item(&mut self, tab_index: usize, target_index: usize) {
    let current_len = self
      .list_view(tab_index)
      .map_or(0, ListView::<ListEntry>::len);

    if target_index < current_len {
      return;
    }

    let Some(tab) = self.tabs.get(tab_index) else {
      return;
    };

    if !tab.has_more {
      return;
    }

    if let Some(slot) = self.pending_selections.get_mut(tab_index) {
      *slot = Some(target_index);
    }

    self.start_load_for_tab(tab_index);
  }

  /// Queues a fetch of `tab_index` starting at `offset`, unless one is
  /// already in flight.
  fn fetch_tab(&mut self, tab_index: usize, offset: usize) -> bool {
    let Some(feed) = self.tabs.get(tab_index).map(|tab| tab.feed.clone())
    else {
      return false;
    };

    match self.tab_loading.get_mut(tab_index) {
      Some(flag) if !*flag => *flag = true,
      _ => return false,
    }

    self.pending_effects.push(Effect::FetchFeed {
      feed,
      offset,
      tab_index,
    });

    true
  }

  fn handle_compose_key(&mut self, key: KeyEvent) -> Command {
    if self.composer.is_none() {
      return Command::None;
    }

    match key.code {
      KeyCode::Esc => Command::CancelCompose,
      KeyCode::Enter => Command::SubmitCompose,
      KeyCode::Backspace => {
        if let Some(composer) = self.composer.as_mut() {
          composer.buffer.pop();
        }

        self.update_compose_message();

        Command::None
      }
      KeyCode::Char(ch) => {
        let modifiers = key.modifiers;

        if modifiers.contains(KeyModifiers::CONTROL)
          || modifiers.contains(KeyModifiers::ALT)
          || modifiers.contains(KeyModifiers::SUPER)
        {
          return Command::None;
        }

        if let Some(composer) = self.composer.as_mut() {
          composer.buffer.push(ch);
        }

        self.update_compose_message();

        Command::None
      }
      _ => Command::None,
    }
  }

  /// Applies a finished request and returns the follow-up effects it
  /// triggers (refetches after successful writes).
  pub(crate) fn handle_event(&mut self, event: Event) -> Vec<Effect> {
    match event {
      Event::FeedItems {
        offset,
        tab_index,
        result,
      } => {
        if let Some(flag) = self.tab_loading.get_mut(tab_index) {
          *flag = false;
        }

        let target = self
          .pending_selections
          .get_mut(tab_index)
          .and_then(Option::take);

        match result {
          Ok(entries) => {
            if let Some(tab) = self.tabs.get_mut(tab_index) {
              tab.has_more = entries.len() >= INITIAL_BATCH_SIZE;
            }

            if let Some(list) = self.list_view_mut(tab_index) {
              if offset == 0 {
                list.replace(entries);
              } else if !entries.is_empty() {
                list.extend(entries);
              }

              if let Some(target) = target {
                if target < list.len() {
                  list.set_selected(target);
                } else if !list.is_empty() {
                  list.set_selected(list.len().saturating_sub(1));
                }
              }
            }

            self.settle_message();
          }
          Err(error) => {
            let label = self
              .tabs
              .get(tab_index)
              .map_or_else(|| "entries".to_string(), |tab| tab.label.clone());

            warn!(tab = %label, offset, "feed fetch failed: {error:#}");

            self.set_transient_message(
              format!("Could not load {label}: {error}"),
              Tone::Error,
            );
          }
        }
      }
      Event::Thread { request_id, result } => {
        let Some(pending) = self.pending_thread.as_ref() else {
          return Vec::new();
        };

        if pending.request_id != request_id {
          return Vec::new();
        }

        let Some(pending) = self.pending_thread.take() else {
          return Vec::new();
        };

        match result {
          Ok(thread) => {
            let mut view = CommentView::new(thread);

            if let Mode::Thread(current) = &self.mode
              && current.post_id() == view.post_id()
            {
              view.collapse_ids(&current.collapsed_ids());
              view.offset = current.offset;
            } else {
              self.store_active_list_view();
            }

            self.mode = Mode::Thread(view);

            self.settle_message();
          }
          Err(error) => {
            warn!(post_id = pending.post_id, "thread fetch failed: {error:#}");

            self.set_transient_message(
              format!("Could not load post: {error}"),
              Tone::Error,
            );
          }
        }
      }
      Event::CommentCreated {
        parent_comment_id,
        post_id,
        result,
      } => {
        let (noun, posted) = if parent_comment_id.is_some() {
          ("reply", "Reply posted")
        } else {
          ("comment", "Comment posted")
        };

        match result {
          Ok(()) => {
            self.set_transient_message(posted.into(), Tone::Info);

            if let Mode::Thread(view) = &self.mode
              && view.post_id() == post_id
            {
              self.request_thread(post_id, parent_comment_id);
            }
          }
          Err(error) => self.set_transient_message(
            format!("Could not post {noun}: {error}"),
            Tone::Error,
          ),
        }
      }
      Event::CommunityCreated { name, result } => match result {
        Ok(()) => {
          self.set_transient_message(
            format!("Created community \"{}\"", truncate(&name, 40)),
            Tone::Info,
          );

          self.refresh_feeds(|feed| *feed == Feed::Communities);
        }
        Err(error) => self.set_transient_message(
          format!("Could not create community: {error}"),
          Tone::Error,
        ),
      },
      Event::PostCreated {
        community_id,
        result,
      } => match result {
        Ok(()) => {
          self.set_transient_message("Post created".into(), Tone::Info);

          self.refresh_feeds(|feed| {
            *feed == Feed::Posts
              || (community_id.is_some() && feed.community_id() == community_id)
          });
        }
        Err(error) => self.set_transient_message(
          format!("Could not create post: {error}"),
          Tone::Error,
        ),
      },
      Event::SignedOut { result } => match result {
        Ok(()) => {
          self.viewer = None;

          self.set_transient_message("Signed out".into(), Tone::Info);
        }
        Err(error) => self.set_transient_message(
          format!("Could not sign out: {error}"),
          Tone::Error,
        ),
      },
      Event::VoteCast { post_id, result } => {
        self.vote_in_flight = false;

        match result {
          Ok(change) => {
            self.set_transient_message(change.describe().into(), Tone::Info);

            self.request_votes(post_id);
          }
          Err(error) => self.set_transient_message(
            format!("Could not vote: {error}"),
            Tone::Error,
          ),
        }
      }
      Event::Votes {
        post_id,
        request_id,
        result,
      } => {
        if self.votes_request_id != Some(request_id) {
          debug!(post_id, request_id, "ignoring superseded vote tally");
          return std::mem::take(&mut self.pending_effects);
        }

        self.votes_request_id = None;

        match result {
          Ok(summary) => {
            if let Mode::Thread(view) = &mut self.mode
              && view.post_id() == post_id
            {
              view.votes = summary;
            }
          }
          Err(error) => {
            warn!(post_id, "vote fetch failed: {error:#}");

            self.set_transient_message(
              format!("Could not load votes: {error}"),
              Tone::Error,
            );
          }
        }
      }
    }

    std::mem::take(&mut self.pending_effects)
  }

  pub(crate) fn help(&self) -> &HelpView {
    &self.help
  }

  pub(crate) fn help_is_visible(&self) -> bool {
    self.help.is_visible()
  }

  fn idle_status(&self) -> &'static str {
    match self.mode {
      Mode::List(_) => LIST_STATUS,
      Mode::Thread(_) => THREAD_STATUS,
    }
  }

  fn issue_request_id(&mut self) -> u64 {
    let request_id = self.next_request_id;

    self.next_request_id = self.next_request_id.wrapping_add(1);

    request_id
  }

  pub(crate) fn list_height(&self) -> usize {
    self.list_height
  }

  fn list_view(&self, index: usize) -> Option<&ListView<ListEntry>> {
    if index >= self.tabs.len() {
      return None;
    }

    if let Mode::List(view) = &self.mode
      && index == self.active_tab
    {
      return Some(view);
    }

    self.tab_views.get(index).and_then(|slot| slot.as_ref())
  }

  fn list_view_mut(
    &mut self,
    index: usize,
  ) -> Option<&mut ListView<ListEntry>> {
    if index >= self.tabs.len() {
      return None;
    }

    match &mut self.mode {
      Mode::List(view) if index == self.active_tab => Some(view),
      _ => self.tab_views.get_mut(index).and_then(|slot| slot.as_mut()),
    }
  }

  pub(crate) fn message(&self) -> &str {
    &self.message
  }

  pub(crate) fn message_tone(&self) -> Tone {
    self
      .transient_message
      .as_ref()
      .filter(|transient| transient.current() == self.message)
      .map_or(Tone::Info, TransientMessage::tone)
  }

  pub(crate) fn mode_mut(&mut self) -> &mut Mode {
    &mut self.mode
  }

  pub(crate) fn new(
    tabs: Vec<(Tab, ListView<ListEntry>)>,
    viewer: Option<User>,
  ) -> Self {
    let (mut tab_views, mut tab_meta) = (Vec::new(), Vec::new());

    for (tab, view) in tabs {
      tab_meta.push(tab);
      tab_views.push(Some(view));
    }

    let initial_view = tab_views
      .get_mut(0)
      .and_then(Option::take)
      .unwrap_or_default();

    let tab_count = tab_meta.len();

    Self {
      active_tab: 0,
      composer: None,
      help: HelpView::new(),
      list_height: 0,
      message: LIST_STATUS.into(),
      mode: Mode::List(initial_view),
      next_request_id: 0,
      pending_effects: Vec::new(),
      pending_selections: vec![None; tab_count],
      pending_thread: None,
      tab_loading: vec![false; tab_count],
      tab_views,
      tabs: tab_meta,
      transient_message: None,
      viewer,
      vote_in_flight: false,
      votes_request_id: None,
    }
  }

  fn open_image(&mut self) {
    let url = match &self.mode {
      Mode::List(_) => {
        self.current_entry().and_then(|entry| entry.link.clone())
      }
      Mode::Thread(view) => view.image_link().map(str::to_string),
    };

    match url {
      Some(url) => self.pending_effects.push(Effect::OpenUrl { url }),
      None => {
        let on_post = match &self.mode {
          Mode::List(_) => self
            .current_entry()
            .is_some_and(|entry| entry.kind == EntryKind::Post),
          Mode::Thread(_) => true,
        };

        if on_post {
          self.set_transient_message(
            "This post has no image".into(),
            Tone::Info,
          );
        }
      }
    }
  }

  fn open_selected(&mut self) {
    let Some(entry) = self.current_entry().cloned() else {
      return;
    };

    match entry.kind {
      EntryKind::Community => {
        let index = self.ensure_community_tab(entry.id, entry.title);
        self.switch_to_tab(index);
      }
      EntryKind::Post => {
        if !self.help.is_visible() {
          self.message = LOADING_THREAD_STATUS.into();
        }

        self.request_thread(entry.id, None);
      }
    }
  }

  fn page_down(&mut self) {
    if self.tabs.is_empty() {
      return;
    }

    let tab_index = self.active_tab.min(self.tabs.len().saturating_sub(1));

    let current = self
      .list_view(tab_index)
      .map_or(0, ListView::<ListEntry>::selected_raw);

    let jump = self.page_jump();

    self.select_index(current.saturating_add(jump));
  }

  fn page_jump(&self) -> usize {
    self.list_height.saturating_sub(1).max(1)
  }

  fn page_up(&mut self) {
    if self.tabs.is_empty() {
      return;
    }

    let tab_index = self.active_tab.min(self.tabs.len().saturating_sub(1));

    let current = self
      .list_view(tab_index)
      .map_or(0, ListView::<ListEntry>::selected_raw);

    let jump = self.page_jump();

    self.select_index(current.saturating_sub(jump));
  }

  fn refresh_active_tab(&mut self) {
    let Some(tab_index) = self.resolved_active_tab() else {
      return;
    };

    if let Some(slot) = self.pending_selections.get_mut(tab_index) {
      *slot = None;
    }

    if self.fetch_tab(tab_index, 0) {
      if !self.help.is_visible() {
        self.message = LOADING_ENTRIES_STATUS.into();
      }
    } else {
      self.set_transient_message(
        "Already loading, try again in a moment".into(),
        Tone::Info,
      );
    }
  }

  fn refresh_feeds(&mut self, matches: impl Fn(&Feed) -> bool) {
    let indexes = self
      .tabs
      .iter()
      .enumerate()
      .filter(|(_, tab)| matches(&tab.feed))
      .map(|(index, _)| index)
      .collect::<Vec<_>>();

    for index in indexes {
      if !self.fetch_tab(index, 0) {
        debug!(tab = index, "skipping refresh of tab that is already loading");
      }
    }
  }

  fn request_thread(&mut self, post_id: i64, focus: Option<i64>) {
    let request_id = self.issue_request_id();

    self.pending_thread = Some(PendingThread {
      post_id,
      request_id,
    });

    self.pending_effects.push(Effect::FetchThread {
      focus,
      post_id,
      request_id,
    });
  }

  /// Queues a tally refetch; only the most recent one is applied.
  fn request_votes(&mut self, post_id: i64) {
    let request_id = self.issue_request_id();

    self.votes_request_id = Some(request_id);

    self
      .pending_effects
      .push(Effect::FetchVotes { post_id, request_id });
  }

  fn require_viewer(&mut self, message: &str) -> bool {
    if self.viewer.is_some() {
      return true;
    }

    self.set_transient_message(message.into(), Tone::Error);

    false
  }

  pub(crate) fn resolved_active_tab(&self) -> Option<usize> {
    if self.tabs.is_empty() {
      None
    } else {
      Some(self.active_tab.min(self.tabs.len().saturating_sub(1)))
    }
  }

  fn restore_active_list_view(&mut self) {
    if let Some(slot) = self.tab_views.get_mut(self.active_tab) {
      if let Some(view) = slot.take() {
        self.mode = Mode::List(view);
      } else if !matches!(self.mode, Mode::List(_)) {
        self.mode = Mode::List(ListView::default());
      }
    } else if !matches!(self.mode, Mode::List(_)) {
      self.mode = Mode::List(ListView::default());
    }
  }

  fn select_index(&mut self, target: usize) {
    if self.tabs.is_empty() {
      return;
    }

    let tab_index = self.active_tab.min(self.tabs.len().saturating_sub(1));

    self.ensure_item(tab_index, target);

    if let Some(list) = self.list_view_mut(tab_index)
      && target < list.len()
    {
      list.set_selected(target);
    }
  }

  fn select_next(&mut self) {
    if self.tabs.is_empty() {
      return;
    }

    let tab_index = self.active_tab.min(self.tabs.len().saturating_sub(1));

    let current = self
      .list_view(tab_index)
      .map_or(0, ListView::<ListEntry>::selected_raw);

    self.select_index(current.saturating_add(1));
  }

  fn select_previous(&mut self) {
    if self.tabs.is_empty() {
      return;
    }

    let tab_index = self.active_tab.min(self.tabs.len().saturating_sub(1));

    let current = self
      .list_view(tab_index)
      .map_or(0, ListView::<ListEntry>::selected_raw);

    self.select_index(current.saturating_sub(1));
  }

  pub(crate) fn set_list_height(&mut self, height: usize) {
    self.list_height = height;
  }

  pub(crate) fn set_transient_message(&mut self, message: String, tone: Tone) {
    let original = self.transient_message.as_ref().map_or_else(
      || self.message.clone(),
      |transient| transient.original().to_string(),
    );

    self.transient_message =
      Some(TransientMessage::new(message.clone(), original, tone));

    self.message = message;
  }

  /// Puts the idle hint for the current mode back on the status line,
  /// unless help, the composer or a transient message owns it.
  fn settle_message(&mut self) {
    let transient_active = self
      .transient_message
      .as_ref()
      .is_some_and(|transient| transient.current() == self.message);

    if self.help.is_visible() || self.composer.is_some() || transient_active {
      return;
    }

    self.message = self.idle_status().into();
  }

  fn sign_out(&mut self) {
    if self.viewer.is_none() {
      self.set_transient_message("You are not signed in".into(), Tone::Info);
      return;
    }

    self.set_transient_message("Signing out...".into(), Tone::Info);

    self.pending_effects.push(Effect::SignOut);
  }

  fn start_load_for_tab(&mut self, tab_index: usize) {
    let Some(tab) = self.tabs.get(tab_index) else {
      return;
    };

    if !tab.has_more {
      return;
    }

    let offset = self
      .list_view(tab_index)
      .map_or(0, ListView::<ListEntry>::len);

    if self.fetch_tab(tab_index, offset) && !self.help.is_visible() {
      self.message = LOADING_ENTRIES_STATUS.into();
    }
  }

  fn store_active_list_view(&mut self) {
    if let Mode::List(view) = &mut self.mode
      && let Some(slot) = self.tab_views.get_mut(self.active_tab)
    {
      *slot = Some(std::mem::take(view));
    }
  }

  fn submit_compose(&mut self) {
    let Some(composer) = self.composer.as_mut() else {
      return;
    };

    let Some(submission) = composer.submit() else {
      self.update_compose_message();
      return;
    };

    if let Some(composer) = self.composer.take() {
      self.message = composer.message_backup;
    }

    let (effect, status) = match submission {
      Submission::Comment {
        content,
        parent_comment_id,
        post_id,
      } => (
        Effect::CreateComment {
          content,
          parent_comment_id,
          post_id,
        },
        "Posting...",
      ),
      Submission::Community { description, name } => (
        Effect::CreateCommunity { description, name },
        "Creating community...",
      ),
      Submission::Post(draft) => {
        (Effect::CreatePost { draft }, "Uploading image and creating post...")
      }
    };

    if !self.help.is_visible() {
      self.set_transient_message(status.into(), Tone::Info);
    }

    self.pending_effects.push(effect);
  }

  fn switch_tab_left(&mut self) {
    let tab_count = self.tabs.len();

    if tab_count != 0 {
      self.switch_to_tab((self.active_tab + tab_count - 1) % tab_count);
    }
  }

  fn switch_tab_right(&mut self) {
    let tab_count = self.tabs.len();

    if tab_count != 0 {
      self.switch_to_tab((self.active_tab + 1) % tab_count);
    }
  }

  fn switch_to_tab(&mut self, index: usize) {
    if index >= self.tabs.len() {
      return;
    }

    self.store_active_list_view();
    self.active_tab = index;
    self.restore_active_list_view();
  }

  pub(crate) fn tab(&self, index: usize) -> Option<&Tab> {
    self.tabs.get(index)
  }

  pub(crate) fn tab_loading(&self) -> &[bool] {
    &self.tab_loading
  }

  pub(crate) fn tabs(&self) -> &[Tab] {
    &self.tabs
  }

  fn update_compose_message(&mut self) {
    if let Some(composer) = &self.composer {
      self.message = truncate(&composer.prompt(), 200);
    }
  }

  pub(crate) fn update_transient_message(&mut self) {
    if let Some(transient) = self.transient_message.clone() {
      if self.message != transient.current() {
        self.transient_message = None;
      } else if transient.is_expired() {
        self.message = transient.original().to_string();
        self.transient_message = None;
      }
    }
  }

  pub(crate) fn viewer(&self) -> Option<&User> {
    self.viewer.as_ref()
  }

  fn vote(&mut self, value: i8) {
    let Mode::Thread(view) = &self.mode else {
      return;
    };

    let post_id = view.post_id();

    if !self.require_viewer("You must be logged in to vote") {
      return;
    }

    if self.vote_in_flight {
      self.set_transient_message(
        "Still recording your last vote".into(),
        Tone::Info,
      );
      return;
    }

    self.vote_in_flight = true;

    self.pending_effects.push(Effect::CastVote { post_id, value });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
  }

  fn post_entry(id: i64) -> ListEntry {
    ListEntry {
      detail: None,
      id,
      kind: EntryKind::Post,
      link: Some(format!("https://cdn.example.com/{id}.png")),
      title: format!("Post {id}"),
    }
  }

  fn community_entry(id: i64, name: &str) -> ListEntry {
    ListEntry {
      detail: None,
      id,
      kind: EntryKind::Community,
      link: None,
      title: name.to_string(),
    }
  }

  fn viewer() -> User {
    User {
      email: Some("ada@example.com".to_string()),
      id: "uid-ada".to_string(),
      user_metadata: session::UserMetadata {
        avatar_url: None,
        user_name: Some("ada".to_string()),
      },
    }
  }

  fn sample_state(viewer: Option<User>) -> State {
    let posts = Tab {
      feed: Feed::Posts,
      has_more: true,
      label: "posts".to_string(),
    };

    let communities = Tab {
      feed: Feed::Communities,
      has_more: false,
      label: "communities".to_string(),
    };

    State::new(
      vec![
        (posts, ListView::new(vec![post_entry(42), post_entry(41)])),
        (
          communities,
          ListView::new(vec![community_entry(7, "rust")]),
        ),
      ],
      viewer,
    )
  }

  fn comment(id: i64, parent: Option<i64>) -> Comment {
    Comment {
      author: format!("user{id}"),
      content: format!("comment {id}"),
      created_at: timestamp(),
      id,
      parent_comment_id: parent,
      post_id: 42,
      user_id: None,
    }
  }

  fn thread(focus: Option<i64>) -> Thread {
    Thread {
      focus,
      post: Post {
        avatar_url: None,
        comment_count: None,
        communities: None,
        community_id: None,
        content: "body".to_string(),
        created_at: timestamp(),
        id: 42,
        image_url: None,
        like_count: None,
        title: "Post 42".to_string(),
      },
      roots: comment_tree::build(
        vec![comment(1, None), comment(2, Some(1))],
        OrphanPolicy::Drop,
      ),
      votes: VoteSummary::default(),
    }
  }

  fn open_thread(state: &mut State) {
    let dispatch = state.dispatch_command(Command::OpenSelected);

    let Some(Effect::FetchThread { request_id, .. }) =
      dispatch.effects.first().cloned()
    else {
      panic!("expected a thread fetch");
    };

    let effects = state.handle_event(Event::Thread {
      request_id,
      result: Ok(thread(None)),
    });

    assert!(effects.is_empty());
    assert!(matches!(state.mode, Mode::Thread(_)));
  }

  fn type_text(state: &mut State, text: &str) {
    for ch in text.chars() {
      let command = state
        .compose_input_command(KeyEvent::new(
          KeyCode::Char(ch),
          KeyModifiers::NONE,
        ))
        .expect("composer is open");

      assert_eq!(command, Command::None);
    }
  }

  #[test]
  fn open_selected_post_emits_thread_fetch() {
    let mut state = sample_state(None);

    let dispatch = state.dispatch_command(Command::OpenSelected);

    assert!(!dispatch.should_exit);
    assert_eq!(
      dispatch.effects,
      vec![Effect::FetchThread {
        focus: None,
        post_id: 42,
        request_id: 0,
      }]
    );
    assert_eq!(state.message, LOADING_THREAD_STATUS);
  }

  #[test]
  fn open_selected_community_adds_and_reuses_its_tab() {
    let mut state = sample_state(None);

    state.dispatch_command(Command::SwitchTabRight);

    let dispatch = state.dispatch_command(Command::OpenSelected);

    assert_eq!(
      dispatch.effects,
      vec![Effect::FetchFeed {
        feed: Feed::Community {
          id: 7,
          name: "rust".to_string(),
        },
        offset: 0,
        tab_index: 2,
      }]
    );
    assert_eq!(state.resolved_active_tab(), Some(2));
    assert_eq!(state.tabs()[2].label, "c/rust");

    state.handle_event(Event::FeedItems {
      offset: 0,
      result: Ok(vec![post_entry(100)]),
      tab_index: 2,
    });

    assert_eq!(state.current_entry().map(|entry| entry.id), Some(100));

    state.dispatch_command(Command::SwitchTabLeft);
    let dispatch = state.dispatch_command(Command::OpenSelected);

    assert!(dispatch.effects.is_empty());
    assert_eq!(state.tabs().len(), 3);
    assert_eq!(state.resolved_active_tab(), Some(2));
  }

  #[test]
  fn stale_thread_results_are_ignored() {
    let mut state = sample_state(None);

    state.dispatch_command(Command::OpenSelected);
    state.dispatch_command(Command::OpenSelected);

    state.handle_event(Event::Thread {
      request_id: 0,
      result: Ok(thread(None)),
    });

    assert!(matches!(state.mode, Mode::List(_)));

    state.handle_event(Event::Thread {
      request_id: 1,
      result: Ok(thread(None)),
    });

    assert!(matches!(state.mode, Mode::Thread(_)));
    assert_eq!(state.message, THREAD_STATUS);
  }

  #[test]
  fn thread_errors_surface_on_status_line() {
    let mut state = sample_state(None);

    state.dispatch_command(Command::OpenSelected);

    state.handle_event(Event::Thread {
      request_id: 0,
      result: Err(anyhow!("JWT expired")),
    });

    assert!(matches!(state.mode, Mode::List(_)));
    assert_eq!(state.message, "Could not load post: JWT expired");
    assert_eq!(state.message_tone(), Tone::Error);
  }

  #[test]
  fn closing_a_thread_drops_its_pending_refetch() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    let effects = state.handle_event(Event::CommentCreated {
      parent_comment_id: None,
      post_id: 42,
      result: Ok(()),
    });

    assert_eq!(effects.len(), 1);

    state.dispatch_command(Command::CloseThread);

    let Effect::FetchThread { request_id, .. } = effects[0].clone() else {
      panic!("expected a thread refetch");
    };

    state.handle_event(Event::Thread {
      request_id,
      result: Ok(thread(None)),
    });

    assert!(matches!(state.mode, Mode::List(_)));
    assert_eq!(state.current_entry().map(|entry| entry.id), Some(42));
  }

  #[test]
  fn commenting_requires_a_viewer() {
    let mut state = sample_state(None);

    open_thread(&mut state);

    let dispatch = state.dispatch_command(Command::ComposeComment);

    assert!(dispatch.effects.is_empty());
    assert!(state.composer.is_none());
    assert_eq!(state.message, "You must be logged in to comment");
  }

  #[test]
  fn submitting_a_reply_emits_create_comment() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    state.dispatch_command(Command::ComposeReply);
    assert_eq!(state.message, "Reply to user1: ");

    type_text(&mut state, "agreed");
    assert_eq!(state.message, "Reply to user1: agreed");

    let command = state
      .compose_input_command(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
      .unwrap();

    let dispatch = state.dispatch_command(command);

    assert_eq!(
      dispatch.effects,
      vec![Effect::CreateComment {
        content: "agreed".to_string(),
        parent_comment_id: Some(1),
        post_id: 42,
      }]
    );
    assert!(state.composer.is_none());
    assert_eq!(state.message, "Posting...");
  }

  #[test]
  fn cancelling_compose_restores_status() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    state.dispatch_command(Command::ComposeComment);
    type_text(&mut state, "draft");

    let command = state
      .compose_input_command(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
      .unwrap();

    state.dispatch_command(command);

    assert!(state.composer.is_none());
    assert_eq!(state.message, THREAD_STATUS);
  }

  #[test]
  fn created_reply_refetches_thread_focused_on_parent() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    let effects = state.handle_event(Event::CommentCreated {
      parent_comment_id: Some(1),
      post_id: 42,
      result: Ok(()),
    });

    assert_eq!(
      effects,
      vec![Effect::FetchThread {
        focus: Some(1),
        post_id: 42,
        request_id: 1,
      }]
    );
    assert_eq!(state.message, "Reply posted");
  }

  #[test]
  fn refetched_thread_keeps_collapsed_comments() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    if let Mode::Thread(view) = state.mode_mut() {
      view.toggle_selected();
    }

    state.handle_event(Event::CommentCreated {
      parent_comment_id: None,
      post_id: 42,
      result: Ok(()),
    });

    state.handle_event(Event::Thread {
      request_id: 1,
      result: Ok(thread(None)),
    });

    let Mode::Thread(view) = &state.mode else {
      panic!("expected thread mode");
    };

    assert!(!view.entries[0].expanded);
  }

  #[test]
  fn voting_emits_cast_then_refetches_votes() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    let dispatch = state.dispatch_command(Command::Like);

    assert_eq!(
      dispatch.effects,
      vec![Effect::CastVote {
        post_id: 42,
        value: LIKE,
      }]
    );

    let effects = state.handle_event(Event::VoteCast {
      post_id: 42,
      result: Ok(VoteChange::Insert { vote: LIKE }),
    });

    let [Effect::FetchVotes {
      post_id: 42,
      request_id,
    }] = effects.as_slice()
    else {
      panic!("expected a vote tally fetch, got {effects:?}");
    };

    assert_eq!(state.message, "Liked");

    let summary = VoteSummary {
      dislikes: 0,
      likes: 1,
      viewer_vote: Some(LIKE),
    };

    state.handle_event(Event::Votes {
      post_id: 42,
      request_id: *request_id,
      result: Ok(summary),
    });

    let Mode::Thread(view) = &state.mode else {
      panic!("expected thread mode");
    };

    assert_eq!(view.votes, summary);
  }

  #[test]
  fn second_vote_waits_for_the_first_to_land() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    assert_eq!(
      state.dispatch_command(Command::Like).effects,
      vec![Effect::CastVote {
        post_id: 42,
        value: LIKE,
      }]
    );

    assert!(state.dispatch_command(Command::Like).effects.is_empty());
    assert!(state.dispatch_command(Command::Dislike).effects.is_empty());
    assert_eq!(state.message, "Still recording your last vote");

    state.handle_event(Event::VoteCast {
      post_id: 42,
      result: Err(anyhow!("network down")),
    });

    assert_eq!(
      state.dispatch_command(Command::Like).effects,
      vec![Effect::CastVote {
        post_id: 42,
        value: LIKE,
      }]
    );
  }

  #[test]
  fn superseded_vote_tallies_are_ignored() {
    let mut state = sample_state(Some(viewer()));

    open_thread(&mut state);

    let mut tally_requests = Vec::new();

    for change in [
      VoteChange::Insert { vote: LIKE },
      VoteChange::Delete { id: 5 },
    ] {
      state.dispatch_command(Command::Like);

      let effects = state.handle_event(Event::VoteCast {
        post_id: 42,
        result: Ok(change),
      });

      let [Effect::FetchVotes { request_id, .. }] = effects.as_slice() else {
        panic!("expected a vote tally fetch, got {effects:?}");
      };

      tally_requests.push(*request_id);
    }

    let latest = VoteSummary::default();

    state.handle_event(Event::Votes {
      post_id: 42,
      request_id: tally_requests[1],
      result: Ok(latest),
    });

    state.handle_event(Event::Votes {
      post_id: 42,
      request_id: tally_requests[0],
      result: Ok(VoteSummary {
        dislikes: 0,
        likes: 1,
        viewer_vote: Some(LIKE),
      }),
    });

    let Mode::Thread(view) = &state.mode else {
      panic!("expected thread mode");
    };

    assert_eq!(view.votes, latest);
  }

  #[test]
  fn signing_out_forgets_the_viewer() {
    let mut state = sample_state(Some(viewer()));

    assert_eq!(
      state.dispatch_command(Command::SignOut).effects,
      vec![Effect::SignOut]
    );

    assert!(state.viewer().is_some());

    let effects = state.handle_event(Event::SignedOut { result: Ok(()) });

    assert!(effects.is_empty());
    assert!(state.viewer().is_none());
    assert_eq!(state.message, "Signed out");

    assert!(state.dispatch_command(Command::SignOut).effects.is_empty());
    assert_eq!(state.message, "You are not signed in");
  }

  #[test]
  fn failed_sign_out_keeps_the_viewer() {
    let mut state = sample_state(Some(viewer()));

    state.dispatch_command(Command::SignOut);

    state.handle_event(Event::SignedOut {
      result: Err(anyhow!("permission denied")),
    });

    assert!(state.viewer().is_some());
    assert_eq!(state.message, "Could not sign out: permission denied");
    assert_eq!(state.message_tone(), Tone::Error);
  }

  #[test]
  fn voting_requires_a_viewer() {
    let mut state = sample_state(None);

    open_thread(&mut state);

    let dispatch = state.dispatch_command(Command::Dislike);

    assert!(dispatch.effects.is_empty());
    assert_eq!(state.message, "You must be logged in to vote");
  }

  #[test]
  fn scrolling_past_the_end_loads_next_page() {
    let mut state = sample_state(None);

    state.dispatch_command(Command::SelectNext);

    let dispatch = state.dispatch_command(Command::SelectNext);

    assert_eq!(
      dispatch.effects,
      vec![Effect::FetchFeed {
        feed: Feed::Posts,
        offset: 2,
        tab_index: 0,
      }]
    );
    assert_eq!(state.message, LOADING_ENTRIES_STATUS);

    state.handle_event(Event::FeedItems {
      offset: 2,
      result: Ok(vec![post_entry(40)]),
      tab_index: 0,
    });

    assert_eq!(state.current_entry().map(|entry| entry.id), Some(40));
    assert!(!state.tabs()[0].has_more);
    assert_eq!(state.message, LIST_STATUS);
  }

  #[test]
  fn refresh_replaces_active_tab_from_the_start() {
    let mut state = sample_state(None);

    let dispatch = state.dispatch_command(Command::Refresh);

    assert_eq!(
      dispatch.effects,
      vec![Effect::FetchFeed {
        feed: Feed::Posts,
        offset: 0,
        tab_index: 0,
      }]
    );

    let dispatch = state.dispatch_command(Command::Refresh);
    assert!(dispatch.effects.is_empty());

    state.handle_event(Event::FeedItems {
      offset: 0,
      result: Ok(vec![post_entry(43), post_entry(42)]),
      tab_index: 0,
    });

    assert_eq!(state.current_entry().map(|entry| entry.id), Some(43));
  }

  #[test]
  fn created_community_reloads_communities_tab() {
    let mut state = sample_state(None);

    state.dispatch_command(Command::ComposeCommunity);
    type_text(&mut state, "rust");
    state.dispatch_command(Command::SubmitCompose);
    type_text(&mut state, "All things Rust");

    let dispatch = state.dispatch_command(Command::SubmitCompose);

    assert_eq!(
      dispatch.effects,
      vec![Effect::CreateCommunity {
        description: "All things Rust".to_string(),
        name: "rust".to_string(),
      }]
    );

    let effects = state.handle_event(Event::CommunityCreated {
      name: "rust".to_string(),
      result: Ok(()),
    });

    assert_eq!(
      effects,
      vec![Effect::FetchFeed {
        feed: Feed::Communities,
        offset: 0,
        tab_index: 1,
      }]
    );
  }

  #[test]
  fn new_post_in_community_tab_is_filed_there() {
    let mut state = sample_state(Some(viewer()));

    state.dispatch_command(Command::SwitchTabRight);
    state.dispatch_command(Command::OpenSelected);
    state.handle_event(Event::FeedItems {
      offset: 0,
      result: Ok(Vec::new()),
      tab_index: 2,
    });

    state.dispatch_command(Command::ComposePost);
    assert_eq!(state.message, "Post title: ");

    for field in ["Sunset", "From the pier", "/tmp/sunset.png"] {
      type_text(&mut state, field);

      let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

      let command = state.compose_input_command(enter).unwrap();

      let dispatch = state.dispatch_command(command);

      if field == "/tmp/sunset.png" {
        assert_eq!(
          dispatch.effects,
          vec![Effect::CreatePost {
            draft: PostDraft {
              community_id: Some(7),
              content: "From the pier".to_string(),
              image_path: PathBuf::from("/tmp/sunset.png"),
              title: "Sunset".to_string(),
            },
          }]
        );
      } else {
        assert!(dispatch.effects.is_empty());
      }
    }

    let effects = state.handle_event(Event::PostCreated {
      community_id: Some(7),
      result: Ok(()),
    });

    assert_eq!(
      effects,
      vec![
        Effect::FetchFeed {
          feed: Feed::Posts,
          offset: 0,
          tab_index: 0,
        },
        Effect::FetchFeed {
          feed: Feed::Community {
            id: 7,
            name: "rust".to_string(),
          },
          offset: 0,
          tab_index: 2,
        },
      ]
    );
  }

  #[test]
  fn open_image_uses_selected_post_link() {
    let mut state = sample_state(None);

    let dispatch = state.dispatch_command(Command::OpenImage);

    assert_eq!(
      dispatch.effects,
      vec![Effect::OpenUrl {
        url: "https://cdn.example.com/42.png".to_string(),
      }]
    );

    open_thread(&mut state);

    let dispatch = state.dispatch_command(Command::OpenImage);

    assert!(dispatch.effects.is_empty());
    assert_eq!(state.message, "This post has no image");
  }
}
