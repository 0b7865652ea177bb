use {
  anyhow::{Context, anyhow, bail},
  app::App,
  chrono::{DateTime, Local, Utc},
  client::Client,
  command::Command,
  command_dispatch::CommandDispatch,
  comment::{Comment, NewComment},
  comment_entry::CommentEntry,
  comment_tree::{CommentNode, OrphanPolicy},
  comment_view::CommentView,
  community::{Community, NewCommunity},
  composer::{Composer, Draft, ReplyTarget, Submission},
  config::{Config, Credentials},
  crossterm::{
    event as crossterm_event,
    event::{
      Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    },
    execute,
    style::Stylize,
    terminal::{
      EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
      enable_raw_mode,
    },
  },
  effect::Effect,
  event::Event,
  feed::Feed,
  futures::future::join_all,
  help_view::HelpView,
  list_entry::{EntryKind, ListEntry},
  list_view::ListView,
  mode::Mode,
  pending_thread::PendingThread,
  post::{NewPost, Post, PostDraft},
  ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
      Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
    },
  },
  reqwest::{RequestBuilder, Response, StatusCode, Url},
  serde::{Deserialize, Serialize},
  serde_json::{Value, json},
  session::{Session, SessionStore, User},
  state::State,
  std::{
    backtrace::BacktraceStatus,
    collections::{HashMap, HashSet},
    env, fs,
    io::{self, IsTerminal, Stdout},
    iter,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
  },
  tab::Tab,
  thread::Thread,
  tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
  },
  tracing::{debug, info, warn},
  tracing_subscriber::EnvFilter,
  transient_message::{Tone, TransientMessage},
  utils::{format_count, format_timestamp, truncate, wrap_text},
  vote::{DISLIKE, LIKE, NewVote, Vote, VoteChange, VoteSummary},
};

mod app;
mod client;
mod command;
mod command_dispatch;
mod comment;
mod comment_entry;
mod comment_tree;
mod comment_view;
mod community;
mod composer;
mod config;
mod effect;
mod event;
mod feed;
mod help_view;
mod list_entry;
mod list_view;
mod logging;
mod mode;
mod pending_thread;
mod post;
mod session;
mod state;
mod tab;
mod thread;
mod transient_message;
mod utils;
mod vote;

const INITIAL_BATCH_SIZE: usize = 30;

const LIST_STATUS: &str = "↑/k up • ↓/j down • enter open • o image • n post • N community • r refresh • q quit • ? help";

const THREAD_STATUS: &str = "↑/k up • ↓/j down • ←/h collapse • →/l expand • c comment • r reply • +/- vote • esc back • ? help";

const HELP_TITLE: &str = "Help";
const HELP_STATUS: &str = "Press ? or esc to close help";

const LOADING_ENTRIES_STATUS: &str = "Loading...";
const LOADING_THREAD_STATUS: &str = "Loading post...";

const BASE_INDENT: &str = " ";

type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

fn initialize_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
  enable_raw_mode()?;

  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen)?;

  Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(
  terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result {
  disable_raw_mode()?;

  execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

  terminal.show_cursor()?;

  Ok(())
}

async fn run() -> Result {
  let config = Config::from_env().context("could not load configuration")?;

  logging::init(&config).context("could not set up logging")?;

  info!(url = %config.supabase_url, "starting");

  let client = Client::new(&config);

  let viewer = client
    .authenticate()
    .await
    .context("could not restore session")?;

  let tabs = client.load_tabs(INITIAL_BATCH_SIZE).await?;

  let mut terminal = initialize_terminal()?;

  let mut app = App::new(client, tabs, viewer);

  let result = app.run(&mut terminal);

  restore_terminal(&mut terminal)?;

  result
}

#[tokio::main]
async fn main() {
  if let Err(error) = run().await {
    tracing::error!("{error:#}");

    let use_color = io::stderr().is_terminal();

    if use_color {
      eprintln!("{} {error}", "error:".bold().red());
    } else {
      eprintln!("error: {error}");
    }

    for (i, error) in error.chain().skip(1).enumerate() {
      if i == 0 {
        eprintln!();

        if use_color {
          eprintln!("{}", "because:".bold().red());
        } else {
          eprintln!("because:");
        }
      }

      if use_color {
        eprintln!("{} {error}", "-".bold().red());
      } else {
        eprintln!("- {error}");
      }
    }

    let backtrace = error.backtrace();

    if backtrace.status() == BacktraceStatus::Captured {
      if use_color {
        eprintln!("{}", "backtrace:".bold().red());
      } else {
        eprintln!("backtrace:");
      }

      eprintln!("{backtrace}");
    }

    process::exit(1);
  }
}
