//! Application state and view composition.
//!
//! `AppState` owns everything the route handlers touch: the GitHub client,
//! the loaded profile (user + filtered repo list), the current view, and the
//! single sandbox slot. Exactly one of {list, detail} is active at a time and
//! the detail view always carries its selected repository.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::github::GithubClient;
use crate::models::{GithubRepo, GithubUser, SandboxStatus, ViewInfo};
use crate::sandbox::{RuntimeLoader, SandboxSession, RUN_TIMEOUT};

pub struct AppState {
    pub login: String,
    client: GithubClient,
    loader: Box<dyn RuntimeLoader>,
    started_at: Instant,
    profile: RwLock<Option<Profile>>,
    view: RwLock<View>,
    /// One sandbox session at a time; replaced wholesale on open.
    sandbox: tokio::sync::Mutex<SandboxSlot>,
}

#[derive(Clone)]
pub struct Profile {
    pub user: GithubUser,
    pub repos: Vec<GithubRepo>,
}

#[derive(Clone)]
pub enum View {
    List,
    Detail { repo: GithubRepo },
}

enum SandboxSlot {
    Empty,
    /// Bootstrap failed; terminal until the next open replaces the slot.
    Failed(String),
    Open(Arc<SandboxSession>),
}

pub type SharedApp = Arc<AppState>;

impl AppState {
    pub fn new(login: impl Into<String>, client: GithubClient, loader: Box<dyn RuntimeLoader>) -> Self {
        Self {
            login: login.into(),
            client,
            loader,
            started_at: Instant::now(),
            profile: RwLock::new(None),
            view: RwLock::new(View::List),
            sandbox: tokio::sync::Mutex::new(SandboxSlot::Empty),
        }
    }

    pub fn client(&self) -> &GithubClient {
        &self.client
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Fetch user profile and repository list concurrently; commit both or
    /// neither. A missing user is a failure here, not an absence.
    pub async fn load(&self) -> Result<()> {
        let (user, repos) = tokio::try_join!(
            self.client.fetch_user(&self.login),
            self.client.fetch_repos(&self.login),
        )?;

        let user = user
            .ok_or_else(|| AppError::NotFound(format!("GitHub user: {}", self.login)))?;
        let repos = filter_showcase_repos(&self.login, repos);

        tracing::info!("loaded profile for {} ({} repos)", self.login, repos.len());

        let mut slot = self.write_profile()?;
        *slot = Some(Profile { user, repos });
        Ok(())
    }

    pub fn user(&self) -> Result<GithubUser> {
        Ok(self.profile()?.user)
    }

    pub fn repos(&self) -> Result<Vec<GithubRepo>> {
        Ok(self.profile()?.repos)
    }

    pub fn find_repo(&self, name: &str) -> Result<GithubRepo> {
        self.profile()?
            .repos
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| AppError::NotFound(format!("repository: {}", name)))
    }

    pub fn view(&self) -> Result<ViewInfo> {
        let view = self
            .view
            .read()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        Ok(view_info(&view))
    }

    /// Switch to the detail view; always paired with a concrete repository.
    pub fn select_repo(&self, name: &str) -> Result<ViewInfo> {
        let repo = self.find_repo(name)?;
        let mut view = self.write_view()?;
        *view = View::Detail { repo };
        Ok(view_info(&view))
    }

    /// Back to the list view; the selection is cleared with it.
    pub fn back_to_list(&self) -> Result<ViewInfo> {
        let mut view = self.write_view()?;
        *view = View::List;
        Ok(view_info(&view))
    }

    /// Open a fresh sandbox session for a repository. Any previous session
    /// is dropped first; a bootstrap failure leaves a terminal error slot.
    pub async fn open_sandbox(&self, name: &str) -> Result<SandboxStatus> {
        let repo = self.find_repo(name)?;

        let mut slot = self.sandbox.lock().await;
        *slot = SandboxSlot::Empty;

        match SandboxSession::open(self.loader.as_ref(), &self.client, &self.login, &repo.name)
            .await
        {
            Ok(session) => {
                let session = Arc::new(session);
                let status = session.status();
                *slot = SandboxSlot::Open(session);
                Ok(status)
            }
            Err(e) => {
                *slot = SandboxSlot::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn sandbox_status(&self) -> Result<SandboxStatus> {
        match &*self.sandbox.lock().await {
            SandboxSlot::Empty => Err(AppError::NotFound("sandbox session".to_string())),
            SandboxSlot::Failed(msg) => Err(AppError::SandboxUnavailable(msg.clone())),
            SandboxSlot::Open(session) => Ok(session.status()),
        }
    }

    /// Run the loaded source. The slot lock is released before execution so
    /// a concurrent trigger hits the session's phase guard (409) instead of
    /// queueing behind the in-flight run.
    pub async fn run_sandbox(&self) -> Result<SandboxStatus> {
        let session = match &*self.sandbox.lock().await {
            SandboxSlot::Empty => return Err(AppError::NotFound("sandbox session".to_string())),
            SandboxSlot::Failed(msg) => {
                return Err(AppError::SandboxUnavailable(msg.clone()))
            }
            SandboxSlot::Open(session) => session.clone(),
        };

        session.run(RUN_TIMEOUT).await?;
        Ok(session.status())
    }

    pub async fn close_sandbox(&self) {
        let mut slot = self.sandbox.lock().await;
        *slot = SandboxSlot::Empty;
    }

    fn profile(&self) -> Result<Profile> {
        self.profile
            .read()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| AppError::Internal("Profile not loaded".to_string()))
    }

    fn write_profile(&self) -> Result<std::sync::RwLockWriteGuard<'_, Option<Profile>>> {
        self.profile
            .write()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))
    }

    fn write_view(&self) -> Result<std::sync::RwLockWriteGuard<'_, View>> {
        self.view
            .write()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))
    }
}

fn view_info(view: &View) -> ViewInfo {
    match view {
        View::List => ViewInfo::List,
        View::Detail { repo } => ViewInfo::Detail {
            selected: repo.clone(),
        },
    }
}

/// Drop the repository whose name equals the profile login (the conventional
/// profile-readme repository); API return order is preserved.
pub fn filter_showcase_repos(login: &str, repos: Vec<GithubRepo>) -> Vec<GithubRepo> {
    repos.into_iter().filter(|r| r.name != login).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn repo(name: &str) -> GithubRepo {
        GithubRepo {
            id: 1,
            name: name.to_string(),
            full_name: format!("alice/{}", name),
            html_url: format!("https://github.com/alice/{}", name),
            description: None,
            stargazers_count: 0,
            forks_count: 0,
            watchers_count: 0,
            language: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            pushed_at: None,
            homepage: None,
            topics: Vec::new(),
        }
    }

    #[test]
    fn profile_readme_repo_is_filtered_out() {
        let repos = vec![repo("alice"), repo("tool-x")];
        let filtered = filter_showcase_repos("alice", repos);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "tool-x");
    }

    #[test]
    fn filtering_preserves_listing_order() {
        let repos = vec![repo("zeta"), repo("alice"), repo("alpha"), repo("mid")];
        let names: Vec<_> = filter_showcase_repos("alice", repos)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn filtering_is_exact_match_on_name() {
        let repos = vec![repo("alice-tools"), repo("Alice")];
        let filtered = filter_showcase_repos("alice", repos);
        assert_eq!(filtered.len(), 2);
    }
}
