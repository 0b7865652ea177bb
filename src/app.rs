use super::*;

pub(crate) struct App {
  client: Client,
  event_rx: UnboundedReceiver<Event>,
  event_tx: UnboundedSender<Event>,
  handle: Handle,
  state: State,
}

impl App {
  fn comment_list_item(entry: &CommentEntry, available_width: u16) -> ListItem {
    let depth_indent = "  ".repeat(entry.depth);
    let indent = format!("{BASE_INDENT}{depth_indent}");

    let toggle = entry.has_children().then_some(if entry.expanded {
      "[-]"
    } else {
      "[+]"
    });

    let mut header = vec![Span::raw(indent.clone())];

    if let Some(symbol) = toggle {
      header.push(Span::raw(symbol));
      header.push(Span::raw(" "));
    }

    header.push(Span::styled(
      entry.header(),
      Style::default().fg(Color::White),
    ));

    let mut lines = vec![Line::from(header)];

    if !entry.body().is_empty() {
      let prefix_width = indent.chars().count();

      let wrap_width =
        (available_width as usize).saturating_sub(prefix_width).max(1);

      for line in wrap_text(entry.body(), wrap_width) {
        lines.push(Line::from(vec![
          Span::raw(indent.clone()),
          Span::styled(line, Style::default().fg(Color::DarkGray)),
        ]));
      }
    }

    lines.push(Line::from(Span::raw(indent)));

    ListItem::new(lines)
  }

  fn draw(&mut self, frame: &mut Frame) {
    let layout = Layout::default()
      .direction(Direction::Vertical)
      .margin(1)
      .constraints([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(frame.area());

    self.draw_tabs(frame, layout[0]);

    let body = match self.state.mode_mut() {
      Mode::List(_) => layout[1],
      Mode::Thread(view) => {
        let lines = Self::post_lines(view, layout[1].width);

        let height = u16::try_from(lines.len().saturating_add(1))
          .unwrap_or(u16::MAX)
          .min(layout[1].height / 2);

        let split = Layout::default()
          .direction(Direction::Vertical)
          .constraints([Constraint::Length(height), Constraint::Min(0)])
          .split(layout[1]);

        let header = Paragraph::new(lines)
          .block(Block::default().borders(Borders::BOTTOM));

        frame.render_widget(header, split[0]);

        split[1]
      }
    };

    self.state.set_list_height(body.height as usize);

    let active_tab = self.state.resolved_active_tab().unwrap_or(0);

    let is_loading = self
      .state
      .tab_loading()
      .get(active_tab)
      .copied()
      .unwrap_or(false);

    let is_communities_tab = self
      .state
      .tab(active_tab)
      .is_some_and(|tab| tab.feed == Feed::Communities);

    let (list_items, selected_index, offset) = match self.state.mode_mut() {
      Mode::List(view) => {
        let items = view.items();

        let list_items: Vec<ListItem> = if items.is_empty() {
          let text = if is_loading {
            LOADING_ENTRIES_STATUS
          } else if is_communities_tab {
            "No communities yet. Press N to create one."
          } else {
            "No posts yet. Press n to write one."
          };

          vec![ListItem::new(Line::from(vec![
            Span::raw(BASE_INDENT),
            Span::raw(text),
          ]))]
        } else {
          items.iter().map(Self::entry_list_item).collect()
        };

        (list_items, view.selected_index(), view.offset())
      }
      Mode::Thread(view) => {
        let (visible, selected_pos) = view.visible_with_selection();

        let list_items: Vec<ListItem> = if visible.is_empty() {
          vec![ListItem::new(Line::from(vec![
            Span::raw(BASE_INDENT),
            Span::raw("No comments yet. Press c to start the discussion."),
          ]))]
        } else {
          visible
            .iter()
            .map(|&idx| Self::comment_list_item(&view.entries[idx], body.width))
            .collect()
        };

        let offset = view.offset.min(selected_pos.unwrap_or(0));

        (list_items, selected_pos, offset)
      }
    };

    let mut list_state = ListState::default()
      .with_selected(selected_index)
      .with_offset(offset);

    let list = List::new(list_items)
      .highlight_style(
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("");

    frame.render_stateful_widget(list, body, &mut list_state);

    self.state.mode_mut().set_offset(list_state.offset());

    let status_color = match self.state.message_tone() {
      Tone::Error => Color::Red,
      Tone::Info => Color::DarkGray,
    };

    let status = Paragraph::new(self.state.message().to_string())
      .style(Style::default().fg(status_color));

    frame.render_widget(status, layout[2]);

    self.state.help().draw(frame);
  }

  fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
    let viewer = self.state.viewer().map_or_else(
      || "not signed in".to_string(),
      |user| {
        format!("signed in as {}", user.display_name().unwrap_or(&user.id))
      },
    );

    let viewer_width =
      u16::try_from(viewer.chars().count().saturating_add(1)).unwrap_or(0);

    let split = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Min(0), Constraint::Length(viewer_width)])
      .split(area);

    let tab_titles: Vec<Line> = self
      .state
      .tabs()
      .iter()
      .map(|tab| Line::from(tab.label.to_uppercase()))
      .collect();

    let tabs_widget = Tabs::new(tab_titles)
      .select(self.state.resolved_active_tab().unwrap_or(0))
      .style(Style::default().fg(Color::DarkGray))
      .highlight_style(
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )
      .divider(Span::raw(" "));

    frame.render_widget(tabs_widget, split[0]);

    frame.render_widget(
      Paragraph::new(viewer).style(Style::default().fg(Color::DarkGray)),
      split[1],
    );
  }

  fn entry_list_item(entry: &ListEntry) -> ListItem<'static> {
    let mut title = vec![Span::raw(BASE_INDENT)];

    if entry.kind == EntryKind::Community {
      title.push(Span::styled("c/", Style::default().fg(Color::DarkGray)));
    }

    title.push(Span::styled(
      entry.title.clone(),
      Style::default().fg(Color::White),
    ));

    if entry.link.is_some() {
      title.push(Span::styled(" [img]", Style::default().fg(Color::DarkGray)));
    }

    let mut lines = vec![Line::from(title)];

    if let Some(detail) = &entry.detail {
      lines.push(Line::from(vec![
        Span::raw(BASE_INDENT),
        Span::styled(detail.clone(), Style::default().fg(Color::DarkGray)),
      ]));
    }

    lines.push(Line::from(Span::raw(BASE_INDENT)));

    ListItem::new(lines)
  }

  fn execute_effect(&mut self, effect: Effect) {
    let client = self.client.clone();

    match effect {
      Effect::CastVote { post_id, value } => self.spawn(async move {
        Event::VoteCast {
          post_id,
          result: client.cast_vote(post_id, value).await,
        }
      }),
      Effect::CreateComment {
        content,
        parent_comment_id,
        post_id,
      } => self.spawn(async move {
        Event::CommentCreated {
          parent_comment_id,
          post_id,
          result: client
            .create_comment(post_id, parent_comment_id, &content)
            .await,
        }
      }),
      Effect::CreateCommunity { description, name } => {
        self.spawn(async move {
          let result = client.create_community(&name, &description).await;
          Event::CommunityCreated { name, result }
        });
      }
      Effect::CreatePost { draft } => self.spawn(async move {
        Event::PostCreated {
          community_id: draft.community_id,
          result: client.create_post(&draft).await,
        }
      }),
      Effect::FetchFeed {
        feed,
        offset,
        tab_index,
      } => self.spawn(async move {
        Event::FeedItems {
          offset,
          tab_index,
          result: client.fetch_feed(&feed, offset, INITIAL_BATCH_SIZE).await,
        }
      }),
      Effect::FetchThread {
        focus,
        post_id,
        request_id,
      } => self.spawn(async move {
        Event::Thread {
          request_id,
          result: client.fetch_thread(post_id, focus).await,
        }
      }),
      Effect::FetchVotes {
        post_id,
        request_id,
      } => self.spawn(async move {
        Event::Votes {
          post_id,
          request_id,
          result: client.fetch_votes(post_id).await,
        }
      }),
      Effect::OpenUrl { url } => match webbrowser::open(&url) {
        Ok(()) => {
          self.state.set_transient_message(
            format!("Opened in browser: {}", truncate(&url, 80)),
            Tone::Info,
          );
        }
        Err(error) => {
          warn!(%url, "could not open browser: {error}");

          self.state.set_transient_message(
            format!("Could not open link: {error}"),
            Tone::Error,
          );
        }
      },
      Effect::SignOut => self.spawn(async move {
        Event::SignedOut {
          result: client.sign_out().await,
        }
      }),
    }
  }

  pub(crate) fn new(
    client: Client,
    tabs: Vec<(Tab, ListView<ListEntry>)>,
    viewer: Option<User>,
  ) -> Self {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let state = State::new(tabs, viewer);

    Self {
      client,
      event_rx,
      event_tx,
      handle: Handle::current(),
      state,
    }
  }

  fn post_lines(view: &CommentView, width: u16) -> Vec<Line<'static>> {
    let post = &view.post;

    let wrap_width = (width as usize)
      .saturating_sub(BASE_INDENT.chars().count())
      .max(1);

    let mut lines = vec![Line::from(vec![
      Span::raw(BASE_INDENT),
      Span::styled(
        post.title.clone(),
        Style::default()
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    ])];

    let posted = match post.community_name() {
      Some(name) => {
        format!("in c/{name} • {}", format_timestamp(&post.created_at))
      }
      None => format_timestamp(&post.created_at),
    };

    lines.push(Line::from(vec![
      Span::raw(BASE_INDENT),
      Span::styled(posted, Style::default().fg(Color::DarkGray)),
    ]));

    if !post.content.trim().is_empty() {
      lines.push(Line::default());

      for line in wrap_text(&post.content, wrap_width) {
        lines.push(Line::from(vec![Span::raw(BASE_INDENT), Span::raw(line)]));
      }
    }

    if let Some(link) = post.image_link() {
      lines.push(Line::from(vec![
        Span::raw(BASE_INDENT),
        Span::styled(
          format!("image: {} (o to open)", truncate(link, 60)),
          Style::default().fg(Color::DarkGray),
        ),
      ]));
    }

    let votes = view.votes;

    let vote_style = |value: i8| {
      if votes.viewer_vote == Some(value) {
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::DarkGray)
      }
    };

    lines.push(Line::default());

    lines.push(Line::from(vec![
      Span::raw(BASE_INDENT),
      Span::styled(format!("▲ {}", votes.likes), vote_style(LIKE)),
      Span::raw("  "),
      Span::styled(format!("▼ {}", votes.dislikes), vote_style(DISLIKE)),
    ]));

    lines
  }

  fn process_pending_events(&mut self) {
    self.state.update_transient_message();

    while let Ok(event) = self.event_rx.try_recv() {
      for effect in self.state.handle_event(event) {
        self.execute_effect(effect);
      }
    }
  }

  pub(crate) fn run(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
  ) -> Result {
    loop {
      self.process_pending_events();

      terminal.draw(|frame| self.draw(frame))?;

      if !crossterm_event::poll(Duration::from_millis(200))? {
        continue;
      }

      let CrosstermEvent::Key(key) = crossterm_event::read()? else {
        continue;
      };

      if key.kind != KeyEventKind::Press {
        continue;
      }

      let command = if self.state.help_is_visible() {
        HelpView::handle_key(key)
      } else if let Some(command) = self.state.compose_input_command(key) {
        command
      } else {
        let page = self.state.list_height().max(1);
        self.state.mode_mut().handle_key(key, page)
      };

      let dispatch = self.state.dispatch_command(command);

      for effect in dispatch.effects {
        self.execute_effect(effect);
      }

      if dispatch.should_exit {
        break;
      }
    }

    Ok(())
  }

  fn spawn<F>(&self, task: F)
  where
    F: Future<Output = Event> + Send + 'static,
  {
    let sender = self.event_tx.clone();

    self.handle.spawn(async move {
      if sender.send(task.await).is_err() {
        debug!("event receiver dropped before request finished");
      }
    });
  }
}
