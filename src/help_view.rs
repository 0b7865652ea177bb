use super::*;

const KEY_WIDTH: usize = 8;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
  (
    "Lists",
    &[
      ("← / h", "previous tab"),
      ("→ / l", "next tab"),
      ("↑ / k", "move selection up"),
      ("↓ / j", "move selection down"),
      ("pg↓", "page down (ctrl+d)"),
      ("pg↑", "page up (ctrl+u)"),
      ("home", "jump to first entry"),
      ("end", "jump to last loaded entry"),
      ("enter", "open a post, or a community's posts"),
      ("o", "open the post image in your browser"),
      ("r", "refresh the current tab"),
      ("n", "write a new post"),
      ("N", "create a community"),
      ("S", "sign out"),
      ("q / esc", "quit"),
    ],
  ),
  (
    "Posts",
    &[
      ("↑ / k", "previous comment"),
      ("↓ / j", "next comment"),
      ("← / h", "collapse or go to parent"),
      ("→ / l", "expand or go to first reply"),
      ("enter", "toggle collapse or expand"),
      ("c", "comment on the post"),
      ("r", "reply to the selected comment"),
      ("+", "like the post (again to undo)"),
      ("-", "dislike the post (again to undo)"),
      ("o", "open the post image in your browser"),
      ("esc", "back to the list"),
    ],
  ),
  (
    "Writing",
    &[
      ("enter", "submit the field and move on"),
      ("bksp", "delete a character"),
      ("esc", "discard the draft"),
    ],
  ),
];

pub(crate) struct HelpView {
  message_backup: Option<String>,
  visible: bool,
}

impl HelpView {
  pub(crate) fn draw(&self, frame: &mut Frame) {
    if !self.visible {
      return;
    }

    let lines = Self::lines();

    let area = Self::help_area(frame.area(), &lines);

    frame.render_widget(Clear, area);

    let help = Paragraph::new(lines)
      .block(Block::default().title(HELP_TITLE).borders(Borders::ALL))
      .wrap(Wrap { trim: false });

    frame.render_widget(help, area);
  }

  pub(crate) fn handle_key(key: KeyEvent) -> Command {
    match key.code {
      KeyCode::Char('?') | KeyCode::Esc => Command::HideHelp,
      KeyCode::Char('q' | 'Q') => Command::Quit,
      _ => Command::None,
    }
  }

  fn help_area(area: Rect, lines: &[Line]) -> Rect {
    fn saturating_usize_to_u16(value: usize) -> u16 {
      u16::try_from(value).unwrap_or(u16::MAX)
    }

    let max_line_width = lines.iter().map(Line::width).max().unwrap_or(0);

    let desired_width =
      saturating_usize_to_u16(max_line_width.saturating_add(2)).max(1);

    let desired_height =
      saturating_usize_to_u16(lines.len().saturating_add(2)).max(1);

    let available_width = area.width.saturating_sub(2).max(1);
    let available_height = area.height.saturating_sub(2).max(1);

    let width = available_width.clamp(1, desired_width).min(area.width);
    let height = available_height.clamp(1, desired_height).min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width, height)
  }

  pub(crate) fn hide(&mut self, message: &mut String) {
    if !self.visible {
      return;
    }

    *message = self
      .message_backup
      .take()
      .unwrap_or_else(|| LIST_STATUS.into());

    self.visible = false;
  }

  pub(crate) fn is_visible(&self) -> bool {
    self.visible
  }

  fn lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (index, (title, bindings)) in SECTIONS.iter().enumerate() {
      if index > 0 {
        lines.push(Line::default());
      }

      lines.push(Line::from(Span::styled(
        format!("{title}:"),
        Style::default().add_modifier(Modifier::BOLD),
      )));

      for (keys, action) in *bindings {
        lines.push(Line::from(vec![
          Span::raw(BASE_INDENT),
          Span::styled(
            format!("{keys:<KEY_WIDTH$}"),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(*action),
        ]));
      }
    }

    lines
  }

  pub(crate) fn new() -> Self {
    Self {
      message_backup: None,
      visible: false,
    }
  }

  pub(crate) fn show(&mut self, message: &mut String) {
    if self.visible {
      return;
    }

    self.message_backup = Some(message.clone());

    *message = HELP_STATUS.into();

    self.visible = true;
  }
}
