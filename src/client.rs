use {super::*, reqwest::Method, tokio::sync::RwLock};

const IMAGE_BUCKET: &str = "post-images";

const POST_SELECT: &str = "*,communities(name)";

#[derive(Debug, Default, Deserialize)]
struct ApiError {
  #[serde(default)]
  error_description: Option<String>,
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  msg: Option<String>,
}

/// A request the backend answered with a non-success status.
#[derive(Debug)]
pub(crate) struct ApiFailure {
  message: String,
  status: StatusCode,
}

#[derive(Clone)]
pub(crate) struct Client {
  anon_key: String,
  base_url: String,
  client: reqwest::Client,
  credentials: Option<Credentials>,
  orphans: OrphanPolicy,
  session: Arc<RwLock<Option<Session>>>,
  store: SessionStore,
}

/// Turns a failed response body into the message the backend meant to show.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
  let parsed = serde_json::from_str::<ApiError>(body).unwrap_or_default();

  parsed
    .message
    .or(parsed.msg)
    .or(parsed.error_description)
    .filter(|message| !message.is_empty())
    .unwrap_or_else(|| {
      let body = body.trim();

      if body.is_empty() {
        format!("request failed with status {status}")
      } else {
        format!("request failed with status {status}: {}", truncate(body, 200))
      }
    })
}

/// Storage key for an uploaded post image.
pub(crate) fn image_key(title: &str, millis: i64, file_name: &str) -> String {
  let title = title
    .trim()
    .chars()
    .map(|ch| if ch == '/' { '-' } else { ch })
    .collect::<String>();

  format!("{title}-{millis}-{file_name}")
}

/// Whether the auth server refused a refresh token outright, as opposed to
/// the request never reaching it.
pub(crate) fn is_rejected_session(error: &anyhow::Error) -> bool {
  error
    .downcast_ref::<ApiFailure>()
    .is_some_and(|failure| failure.status.is_client_error())
}

impl std::fmt::Display for ApiFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

impl std::error::Error for ApiFailure {}

impl Client {
  /// Restores the stored session, refreshing it when close to expiry, or
  /// signs in with the configured credentials.
  pub(crate) async fn authenticate(&self) -> Result<Option<User>> {
    let stored = match self.store.load() {
      Ok(stored) => stored,
      Err(error) => {
        warn!(
          path = %self.store.path().display(),
          "ignoring unreadable session file: {error:#}"
        );
        None
      }
    };

    let now = Utc::now().timestamp();

    let mut session = match stored {
      Some(session) if session.needs_refresh(now) => {
        match self.refresh(&session.refresh_token).await {
          Ok(session) => Some(session),
          Err(error) if is_rejected_session(&error) => {
            warn!("stored session was rejected: {error:#}");

            if let Err(error) = self.store.clear() {
              warn!("could not remove stale session file: {error:#}");
            }

            None
          }
          Err(error) => {
            warn!(
              path = %self.store.path().display(),
              "could not refresh stored session, keeping it: {error:#}"
            );

            None
          }
        }
      }
      stored => stored,
    };

    if session.is_none()
      && let Some(credentials) = &self.credentials
    {
      session = Some(
        self
          .sign_in(credentials)
          .await
          .with_context(|| {
            format!("could not sign in as {}", credentials.email)
          })?,
      );
    }

    match &session {
      Some(session) => {
        self.store.persist(session)?;
        info!(user = %session.user.id, "signed in");
      }
      None => info!("browsing anonymously"),
    }

    let user = session.as_ref().map(|session| session.user.clone());

    *self.session.write().await = session;

    Ok(user)
  }

  async fn authorization(&self) -> Result<String> {
    Ok(match self.fresh_session().await? {
      Some(session) => format!("Bearer {}", session.access_token),
      None => format!("Bearer {}", self.anon_key),
    })
  }

  pub(crate) async fn cast_vote(
    &self,
    post_id: i64,
    value: i8,
  ) -> Result<VoteChange> {
    let user = self.require_viewer("You must be logged in to vote").await?;

    let existing = self
      .request(Method::GET, "rest/v1/votes")
      .await?
      .query(&[
        ("select", "*".to_string()),
        ("post_id", format!("eq.{post_id}")),
        ("user_id", format!("eq.{}", user.id)),
      ])
      .send()
      .await?;

    let existing = Self::check(existing).await?.json::<Vec<Vote>>().await?;

    let change = VoteChange::resolve(existing.first(), value);

    let request = match change {
      VoteChange::Delete { id } => self
        .request(Method::DELETE, "rest/v1/votes")
        .await?
        .query(&[("id", format!("eq.{id}"))]),
      VoteChange::Update { id, vote } => self
        .request(Method::PATCH, "rest/v1/votes")
        .await?
        .query(&[("id", format!("eq.{id}"))])
        .json(&json!({ "vote": vote })),
      VoteChange::Insert { vote } => self
        .request(Method::POST, "rest/v1/votes")
        .await?
        .json(&NewVote {
          post_id,
          user_id: &user.id,
          vote,
        }),
    };

    Self::check(request.header("Prefer", "return=minimal").send().await?)
      .await?;

    info!(post_id, ?change, "vote recorded");

    Ok(change)
  }

  async fn check(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(
      ApiFailure {
        message: error_message(status, &body),
        status,
      }
      .into(),
    )
  }

  pub(crate) async fn create_comment(
    &self,
    post_id: i64,
    parent_comment_id: Option<i64>,
    content: &str,
  ) -> Result {
    let user = self
      .require_viewer(if parent_comment_id.is_some() {
        "you need to be logged in to reply"
      } else {
        "you need to be logged in to comment"
      })
      .await?;

    let author = user
      .display_name()
      .ok_or_else(|| anyhow!("your account has no user name to comment as"))?;

    let response = self
      .request(Method::POST, "rest/v1/comments")
      .await?
      .header("Prefer", "return=minimal")
      .json(&NewComment {
        author,
        content,
        parent_comment_id,
        post_id,
        user_id: &user.id,
      })
      .send()
      .await?;

    Self::check(response).await?;

    info!(post_id, ?parent_comment_id, "comment created");

    Ok(())
  }

  pub(crate) async fn create_community(
    &self,
    name: &str,
    description: &str,
  ) -> Result {
    let response = self
      .request(Method::POST, "rest/v1/communities")
      .await?
      .header("Prefer", "return=minimal")
      .json(&NewCommunity { description, name })
      .send()
      .await?;

    Self::check(response).await?;

    info!(name, "community created");

    Ok(())
  }

  pub(crate) async fn create_post(&self, draft: &PostDraft) -> Result {
    let user = self
      .require_viewer("you need to be logged in to post")
      .await?;

    let image_url = self.upload_image(&draft.title, &draft.image_path).await?;

    let response = self
      .request(Method::POST, "rest/v1/posts")
      .await?
      .header("Prefer", "return=minimal")
      .json(&NewPost {
        avatar_url: user.user_metadata.avatar_url.as_deref(),
        community_id: draft.community_id,
        content: &draft.content,
        image_url: &image_url,
        title: &draft.title,
      })
      .send()
      .await?;

    Self::check(response).await?;

    info!(
      title = %draft.title,
      community_id = ?draft.community_id,
      "post created"
    );

    Ok(())
  }

  pub(crate) async fn fetch_comments(
    &self,
    post_id: i64,
  ) -> Result<Vec<Comment>> {
    debug!(post_id, "fetching comments");

    let response = self
      .request(Method::GET, "rest/v1/comments")
      .await?
      .query(&[
        ("select", "*".to_string()),
        ("post_id", format!("eq.{post_id}")),
        ("order", "created_at.desc".to_string()),
      ])
      .send()
      .await?;

    Ok(Self::check(response).await?.json::<Vec<Comment>>().await?)
  }

  pub(crate) async fn fetch_communities(
    &self,
    offset: usize,
    limit: usize,
  ) -> Result<Vec<Community>> {
    let response = self
      .request(Method::GET, "rest/v1/communities")
      .await?
      .query(&[
        ("select", "*".to_string()),
        ("order", "created_at.desc".to_string()),
        ("offset", offset.to_string()),
        ("limit", limit.to_string()),
      ])
      .send()
      .await?;

    Ok(Self::check(response).await?.json::<Vec<Community>>().await?)
  }

  pub(crate) async fn fetch_community_posts(
    &self,
    community_id: i64,
    offset: usize,
    limit: usize,
  ) -> Result<Vec<Post>> {
    let response = self
      .request(Method::GET, "rest/v1/posts")
      .await?
      .query(&[
        ("select", POST_SELECT.to_string()),
        ("community_id", format!("eq.{community_id}")),
        ("order", "created_at.desc".to_string()),
        ("offset", offset.to_string()),
        ("limit", limit.to_string()),
      ])
      .send()
      .await?;

    Ok(Self::check(response).await?.json::<Vec<Post>>().await?)
  }

  pub(crate) async fn fetch_feed(
    &self,
    feed: &Feed,
    offset: usize,
    limit: usize,
  ) -> Result<Vec<ListEntry>> {
    debug!(feed = %feed.label(), offset, limit, "fetching feed");

    Ok(match feed {
      Feed::Communities => self
        .fetch_communities(offset, limit)
        .await?
        .into_iter()
        .map(ListEntry::from)
        .collect(),
      Feed::Community { id, .. } => self
        .fetch_community_posts(*id, offset, limit)
        .await?
        .into_iter()
        .map(ListEntry::from)
        .collect(),
      Feed::Posts => self
        .fetch_posts(offset, limit)
        .await?
        .into_iter()
        .map(ListEntry::from)
        .collect(),
    })
  }

  pub(crate) async fn fetch_post(&self, id: i64) -> Result<Post> {
    let response = self
      .request(Method::GET, "rest/v1/posts")
      .await?
      .header("Accept", "application/vnd.pgrst.object+json")
      .query(&[("select", POST_SELECT.to_string()), ("id", format!("eq.{id}"))])
      .send()
      .await?;

    Ok(Self::check(response).await?.json::<Post>().await?)
  }

  pub(crate) async fn fetch_posts(
    &self,
    offset: usize,
    limit: usize,
  ) -> Result<Vec<Post>> {
    let response = self
      .request(Method::POST, "rest/v1/rpc/get_posts_with_counts")
      .await?
      .query(&[("offset", offset.to_string()), ("limit", limit.to_string())])
      .json(&json!({}))
      .send()
      .await?;

    Ok(Self::check(response).await?.json::<Vec<Post>>().await?)
  }

  pub(crate) async fn fetch_thread(
    &self,
    post_id: i64,
    focus: Option<i64>,
  ) -> Result<Thread> {
    let (post, comments, votes) = futures::try_join!(
      self.fetch_post(post_id),
      self.fetch_comments(post_id),
      self.fetch_votes(post_id),
    )?;

    let count = comments.len();

    let roots = comment_tree::build(comments, self.orphans);

    debug!(
      post_id,
      comments = count,
      roots = roots.len(),
      "built comment tree"
    );

    Ok(Thread {
      focus,
      post,
      roots,
      votes,
    })
  }

  pub(crate) async fn fetch_votes(&self, post_id: i64) -> Result<VoteSummary> {
    let response = self
      .request(Method::GET, "rest/v1/votes")
      .await?
      .query(&[
        ("select", "*".to_string()),
        ("post_id", format!("eq.{post_id}")),
      ])
      .send()
      .await?;

    let votes = Self::check(response).await?.json::<Vec<Vote>>().await?;

    let viewer = self.viewer().await;

    Ok(VoteSummary::tally(
      &votes,
      viewer.as_ref().map(|user| user.id.as_str()),
    ))
  }

  async fn fresh_session(&self) -> Result<Option<Session>> {
    let now = Utc::now().timestamp();

    {
      let session = self.session.read().await;

      match session.as_ref() {
        Some(session) if session.needs_refresh(now) => {}
        other => return Ok(other.cloned()),
      }
    }

    let mut slot = self.session.write().await;

    let Some(current) = slot.as_ref() else {
      return Ok(None);
    };

    if !current.needs_refresh(now) {
      return Ok(Some(current.clone()));
    }

    let refreshed = self.refresh(&current.refresh_token).await?;

    self.store.persist(&refreshed)?;

    *slot = Some(refreshed.clone());

    Ok(Some(refreshed))
  }

  pub(crate) async fn load_tabs(
    &self,
    limit: usize,
  ) -> Result<Vec<(Tab, ListView<ListEntry>)>> {
    let tasks = Feed::defaults().into_iter().map(|feed| {
      let client = self.clone();

      async move {
        let entries = client
          .fetch_feed(&feed, 0, limit)
          .await
          .with_context(|| format!("failed to load {}", feed.label()))?;

        Ok::<_, anyhow::Error>((
          Tab {
            has_more: entries.len() >= limit,
            label: feed.label(),
            feed,
          },
          ListView::new(entries),
        ))
      }
    });

    join_all(tasks).await.into_iter().collect::<Result<Vec<_>>>()
  }

  pub(crate) fn new(config: &Config) -> Self {
    Self {
      anon_key: config.anon_key.clone(),
      base_url: config.supabase_url.clone(),
      client: reqwest::Client::new(),
      credentials: config.credentials.clone(),
      orphans: config.orphans,
      session: Arc::new(RwLock::new(None)),
      store: SessionStore::new(config.session_file.clone()),
    }
  }

  fn object_url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(&self.base_url)
      .with_context(|| format!("invalid project url {}", self.base_url))?;

    url
      .path_segments_mut()
      .map_err(|()| anyhow!("project url {} cannot be a base", self.base_url))?
      .pop_if_empty()
      .extend(segments);

    Ok(url)
  }

  async fn refresh(&self, refresh_token: &str) -> Result<Session> {
    debug!("refreshing session");

    self
      .token("refresh_token", &json!({ "refresh_token": refresh_token }))
      .await
  }

  async fn request(
    &self,
    method: Method,
    path: &str,
  ) -> Result<RequestBuilder> {
    Ok(
      self
        .client
        .request(method, format!("{}/{path}", self.base_url))
        .header("apikey", &self.anon_key)
        .header("Authorization", self.authorization().await?),
    )
  }

  async fn require_viewer(&self, message: &'static str) -> Result<User> {
    match self.fresh_session().await? {
      Some(session) => Ok(session.user),
      None => bail!(message),
    }
  }

  async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
    debug!(email = %credentials.email, "signing in");

    self
      .token(
        "password",
        &json!({
          "email": credentials.email,
          "password": credentials.password,
        }),
      )
      .await
  }

  /// Forgets the session locally, then revokes it on the auth server. A
  /// failed revocation is logged but does not keep the viewer signed in.
  pub(crate) async fn sign_out(&self) -> Result {
    self.store.clear().with_context(|| {
      format!("could not remove {}", self.store.path().display())
    })?;

    let Some(session) = self.session.write().await.take() else {
      return Ok(());
    };

    info!(user = %session.user.id, "signing out");

    let revoked = async {
      let response = self
        .client
        .post(format!("{}/auth/v1/logout", self.base_url))
        .header("apikey", &self.anon_key)
        .header("Authorization", format!("Bearer {}", session.access_token))
        .send()
        .await?;

      Self::check(response).await.map(drop)
    };

    if let Err(error) = revoked.await {
      warn!("could not revoke session on the server: {error:#}");
    }

    Ok(())
  }

  async fn token(&self, grant_type: &str, body: &Value) -> Result<Session> {
    let response = self
      .client
      .post(format!("{}/auth/v1/token", self.base_url))
      .query(&[("grant_type", grant_type)])
      .header("apikey", &self.anon_key)
      .json(body)
      .send()
      .await?;

    let session = Self::check(response).await?.json::<Session>().await?;

    Ok(session.anchored(Utc::now().timestamp()))
  }

  async fn upload_image(&self, title: &str, path: &Path) -> Result<String> {
    let file_name = path
      .file_name()
      .and_then(|name| name.to_str())
      .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;

    let bytes = tokio::fs::read(path)
      .await
      .with_context(|| format!("could not read {}", path.display()))?;

    let key = image_key(title, Utc::now().timestamp_millis(), file_name);

    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let upload_url =
      self.object_url(&["storage", "v1", "object", IMAGE_BUCKET, &key])?;

    debug!(%upload_url, bytes = bytes.len(), "uploading image");

    let response = self
      .client
      .post(upload_url)
      .header("apikey", &self.anon_key)
      .header("Authorization", self.authorization().await?)
      .header("Content-Type", mime.essence_str())
      .body(bytes)
      .send()
      .await?;

    Self::check(response).await?;

    Ok(
      self
        .object_url(&["storage", "v1", "object", "public", IMAGE_BUCKET, &key])?
        .to_string(),
    )
  }

  pub(crate) async fn viewer(&self) -> Option<User> {
    self
      .session
      .read()
      .await
      .as_ref()
      .map(|session| session.user.clone())
  }
}
