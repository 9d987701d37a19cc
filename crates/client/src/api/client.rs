//! The typed operation surface
//!
//! [`ThreadClient`] translates typed operations into authenticated HTTP
//! requests and typed results/errors back, without leaking the credential.
//! It is stateless and safe for concurrent use; every read is a fresh
//! fetch. Dropping a returned future cancels the in-flight request, and a
//! cancelled request is never retried.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use threadloom_domain::{
    EditRequest, Folder, FolderEntry, FolderEntryKind, MoveStep, Result, Thread, ThreadLoomError,
    ThreadSummary,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::wire::{FolderEnvelope, SearchResponse, ThreadBatch, ThreadEnvelope, ThreadMeta};
use crate::auth::{AccessTokenProvider, StaticToken};
use crate::config::ClientConfig;
use crate::http::HttpClient;

/// Client for the thread/folder document service.
///
/// Cheap to clone; all clones share the same connection pool. Holds no
/// mutable state beyond the immutable configuration and credential
/// provider.
#[derive(Clone)]
pub struct ThreadClient {
    config: ClientConfig,
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
}

/// Input for [`ThreadClient::create_thread`].
///
/// Content is passed through to the service unvalidated; the service's
/// rejection of malformed markup surfaces as
/// [`ThreadLoomError::InvalidContent`].
#[derive(Debug, Clone)]
pub struct NewThreadRequest {
    pub title: Option<String>,
    /// Body markup in the accepted subset (headings, paragraphs, emphasis,
    /// lists, inline/block code)
    pub content: String,
    /// Folders to file the new thread into, atomically with creation
    pub folder_ids: Vec<String>,
}

impl NewThreadRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self { title: None, content: content.into(), folder_ids: Vec::new() }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_ids.push(folder_id.into());
        self
    }
}

/// Results of a search: a lazy, finite, non-restartable sequence.
///
/// The protocol defines no pagination cursor; callers needing more results
/// issue a new search with adjusted terms.
pub struct SearchResults {
    inner: std::vec::IntoIter<ThreadSummary>,
}

impl Iterator for SearchResults {
    type Item = ThreadSummary;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SearchResults {}

impl ThreadClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns `ThreadLoomError::Internal` if the HTTP transport cannot be
    /// initialized.
    pub fn new(config: ClientConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .retry_backoff(config.retry_backoff)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, http, auth })
    }

    /// Create a client from the environment: configuration via
    /// [`crate::config::load`] and the token from
    /// [`crate::auth::TOKEN_ENV_VAR`].
    ///
    /// # Errors
    /// Returns `ThreadLoomError::Config` if either source is invalid.
    pub fn from_env() -> Result<Self> {
        let config = crate::config::load()?;
        let auth = Arc::new(StaticToken::from_env()?);
        Self::new(config, auth)
    }

    /// Fetch a thread snapshot, body included.
    ///
    /// The body is scanned for sections before returning, so callers can
    /// compute insertion targets without a second round trip.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Unauthorized`/`Forbidden` for
    /// credential problems.
    #[instrument(skip(self))]
    pub async fn get_thread(&self, id: &str) -> Result<Thread> {
        let envelope: ThreadEnvelope =
            self.get_json(&format!("1/threads/{id}"), &[], &format!("thread {id}")).await?;
        Ok(envelope.into_thread())
    }

    /// Fetch several threads in one round trip, in the order requested.
    ///
    /// Ids the service does not know are absent from the result rather than
    /// an error; fetch individually to distinguish.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn get_threads(&self, ids: &[&str]) -> Result<Vec<Thread>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let mut batch: ThreadBatch =
            self.get_json("1/threads/", &[("ids", &joined)], "thread batch").await?;
        Ok(ids.iter().filter_map(|id| batch.remove(*id)).map(ThreadEnvelope::into_thread).collect())
    }

    /// Create a thread, optionally filing it into folders with the same
    /// call.
    ///
    /// # Errors
    /// `InvalidContent` if the service rejects the markup.
    #[instrument(skip(self, request), fields(folders = request.folder_ids.len()))]
    pub async fn create_thread(&self, request: NewThreadRequest) -> Result<Thread> {
        let mut form = vec![
            ("content", request.content),
            ("format", "html".to_string()),
        ];
        if let Some(title) = request.title {
            form.push(("title", title));
        }
        if !request.folder_ids.is_empty() {
            form.push(("member_ids", request.folder_ids.join(",")));
        }

        let envelope: ThreadEnvelope =
            self.post_form("1/threads/new-document", &form, "new thread").await?;
        let thread = envelope.into_thread();
        info!(thread_id = %thread.id, "thread created");
        Ok(thread)
    }

    /// Apply an edit and return the updated snapshot.
    ///
    /// Validation is local-first: a section-targeted mode without a section
    /// id fails with `InvalidRequest` before any request is issued.
    ///
    /// # Errors
    /// `InvalidRequest` on local validation failure, `InvalidContent` if
    /// the service rejects the fragment.
    #[instrument(skip(self, request), fields(thread_id = %request.thread_id, mode = ?request.mode))]
    pub async fn edit_thread(&self, request: &EditRequest) -> Result<Thread> {
        request.validate()?;

        let mut form = vec![
            ("thread_id", request.thread_id.clone()),
            ("location", request.mode.wire_code().to_string()),
            ("format", "html".to_string()),
        ];
        if let Some(content) = &request.content {
            form.push(("content", content.clone()));
        }
        if let Some(section_id) = &request.section_id {
            form.push(("section_id", section_id.clone()));
        }

        let what = format!("thread {}", request.thread_id);
        let envelope: ThreadEnvelope =
            self.post_form("1/threads/edit-document", &form, &what).await?;
        Ok(envelope.into_thread())
    }

    /// Search threads by content, bounded by `limit`.
    ///
    /// The bound is enforced client-side as well: even an over-returning
    /// server never yields more than `limit` results. A limit of zero skips
    /// the round trip entirely.
    #[instrument(skip(self))]
    pub async fn search_threads(&self, query: &str, limit: usize) -> Result<SearchResults> {
        if limit == 0 {
            return Ok(SearchResults { inner: Vec::new().into_iter() });
        }

        let count = limit.to_string();
        let response: SearchResponse = self
            .get_json("1/threads/search", &[("query", query), ("count", &count)], "search")
            .await?;

        let mut summaries: Vec<ThreadSummary> =
            response.threads.into_iter().map(ThreadMeta::into_summary).collect();
        summaries.truncate(limit);
        debug!(hits = summaries.len(), "search complete");
        Ok(SearchResults { inner: summaries.into_iter() })
    }

    /// Fetch a folder and its direct children. Does not recurse.
    #[instrument(skip(self))]
    pub async fn get_folder(&self, id: &str) -> Result<Folder> {
        let envelope: FolderEnvelope =
            self.get_json(&format!("1/folders/{id}"), &[], &format!("folder {id}")).await?;
        Ok(envelope.into_folder())
    }

    /// List a folder's direct children as (kind, id, title) entries.
    pub async fn list_folder(&self, id: &str) -> Result<Vec<FolderEntry>> {
        Ok(self.get_folder(id).await?.children)
    }

    /// Walk a folder tree breadth-first, defending against cycles.
    ///
    /// Returns every reachable entry with its depth below the root (direct
    /// children are depth 1). A folder reached through more than one path
    /// is listed each time it appears as a child but traversed only once,
    /// so folder cycles terminate.
    #[instrument(skip(self))]
    pub async fn walk_folder(&self, root_id: &str) -> Result<Vec<(FolderEntry, usize)>> {
        let mut visited: HashSet<String> = HashSet::from([root_id.to_string()]);
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(root_id.to_string(), 0)]);
        let mut entries = Vec::new();

        while let Some((folder_id, depth)) = queue.pop_front() {
            let folder = self.get_folder(&folder_id).await?;
            for child in folder.children {
                if child.kind == FolderEntryKind::Folder {
                    if visited.insert(child.id.clone()) {
                        queue.push_back((child.id.clone(), depth + 1));
                    } else {
                        debug!(folder_id = %child.id, "folder already visited, not descending");
                    }
                }
                entries.push((child, depth + 1));
            }
        }

        Ok(entries)
    }

    /// Move a thread into `to`, optionally removing it from `from`.
    ///
    /// Two independent calls by nature: add to target, then remove from
    /// source. If the removal fails after a successful add, the thread is
    /// filed in both folders and the error is `PartiallyApplied` naming the
    /// failed step; the client never attempts a compensating action.
    pub async fn move_thread(
        &self,
        thread_id: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, thread_id, to, from = from.unwrap_or("-"), "moving thread");

        self.add_member(to, thread_id).await?;

        if let Some(source) = from {
            if source == to {
                debug!(%correlation_id, "source equals target, nothing to remove");
                return Ok(());
            }
            if let Err(cause) = self.remove_member(source, thread_id).await {
                warn!(
                    %correlation_id,
                    thread_id,
                    source,
                    error = %cause,
                    "thread added to target but removal from source failed"
                );
                return Err(ThreadLoomError::PartiallyApplied {
                    step: MoveStep::RemoveFromSource { folder_id: source.to_string() },
                    source: Box::new(cause),
                });
            }
        }

        info!(%correlation_id, thread_id, "move complete");
        Ok(())
    }

    /// Shareable URL for a thread on the human-facing link host.
    ///
    /// The link host is distinct from the API host and never receives API
    /// calls.
    pub fn thread_link(&self, thread_id: &str) -> String {
        format!("{}/{}", self.config.link_base_url.trim_end_matches('/'), thread_id)
    }

    async fn add_member(&self, folder_id: &str, thread_id: &str) -> Result<()> {
        let form = vec![
            ("folder_id", folder_id.to_string()),
            ("thread_ids", thread_id.to_string()),
        ];
        let what = format!("add thread {thread_id} to folder {folder_id}");
        self.post_form_discard("1/folders/add-members", &form, &what).await
    }

    async fn remove_member(&self, folder_id: &str, thread_id: &str) -> Result<()> {
        let form = vec![
            ("folder_id", folder_id.to_string()),
            ("thread_ids", thread_id.to_string()),
        ];
        let what = format!("remove thread {thread_id} from folder {folder_id}");
        self.post_form_discard("1/folders/remove-members", &form, &what).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let token = self.auth.access_token().await?;
        let mut request = self
            .http
            .request(Method::GET, self.endpoint(path))
            .header("Authorization", format!("Bearer {}", token.expose()));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.http.send(request).await?;
        self.decode(response, what, false).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let response = self.send_form(path, form).await?;
        self.decode(response, what, true).await
    }

    async fn post_form_discard(
        &self,
        path: &str,
        form: &[(&str, String)],
        what: &str,
    ) -> Result<()> {
        let response = self.send_form(path, form).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, what, &body, true));
        }
        Ok(())
    }

    async fn send_form(&self, path: &str, form: &[(&str, String)]) -> Result<Response> {
        let token = self.auth.access_token().await?;
        // Writes are form-url-encoded; this is a protocol constraint, not a
        // stylistic choice.
        let request = self
            .http
            .request(Method::POST, self.endpoint(path))
            .header("Authorization", format!("Bearer {}", token.expose()))
            .form(form);
        self.http.send(request).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
        what: &str,
        write: bool,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, what, &body, write));
        }

        response
            .json()
            .await
            .map_err(|e| ThreadLoomError::Internal(format!("failed to decode {what}: {e}")))
    }
}

/// Map a terminal status code to the error taxonomy.
///
/// By the time a 429 or 5xx status reaches this function the transport has
/// already spent its single retry. A 400 means the service rejected the
/// submitted markup on writes, or confirmed the parameters invalid on
/// reads. The credential never appears in the message.
fn status_error(status: StatusCode, what: &str, body: &str, write: bool) -> ThreadLoomError {
    let detail: String = body.trim().chars().take(300).collect();
    let message = if detail.is_empty() {
        format!("{what}: status {status}")
    } else {
        format!("{what}: status {status}: {detail}")
    };

    match status {
        StatusCode::BAD_REQUEST if write => ThreadLoomError::InvalidContent(message),
        StatusCode::BAD_REQUEST => ThreadLoomError::InvalidRequest(message),
        StatusCode::UNAUTHORIZED => ThreadLoomError::Unauthorized(message),
        StatusCode::FORBIDDEN => ThreadLoomError::Forbidden(message),
        StatusCode::NOT_FOUND => ThreadLoomError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => ThreadLoomError::RateLimited(message),
        s if s.is_server_error() => ThreadLoomError::ServiceUnavailable(message),
        _ => ThreadLoomError::Internal(message),
    }
}
