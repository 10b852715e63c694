//! View-shell state: active tab, theme, and the latest-request-wins
//! bookkeeping that stops a slow fetch from overwriting a newer one.
//!
//! There is no true parallelism here, only interleaved async continuations;
//! the shell owns this state single-threadedly and every in-flight fetch
//! carries the generation it was issued under.

use std::path::{Path, PathBuf};

use ruah_shared::constants::THEME_FILE_NAME;
use ruah_store::Profile;

use crate::error::Result;
use crate::session::SessionFile;

/// The four main views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Ranking,
    Chat,
    Quiz,
}

impl Tab {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Ranking => 1,
            Self::Chat => 2,
            Self::Quiz => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    fn parse(s: &str) -> Self {
        match s.trim() {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }
}

/// Ticket for one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    tab: Tab,
    generation: u64,
}

/// Central shell state.
pub struct AppState {
    pub session: SessionFile,
    /// The resolved participant; `None` routes to onboarding.
    pub profile: Option<Profile>,
    pub active_tab: Tab,
    theme: Theme,
    theme_path: Option<PathBuf>,
    generations: [u64; Tab::COUNT],
}

impl AppState {
    pub fn new(session: SessionFile) -> Self {
        Self {
            session,
            profile: None,
            active_tab: Tab::Home,
            theme: Theme::default(),
            theme_path: None,
            generations: [0; Tab::COUNT],
        }
    }

    /// Load the persisted theme from `dir` and remember where to save it.
    pub fn with_theme_dir(mut self, dir: &Path) -> Self {
        let path = dir.join(THEME_FILE_NAME);
        if let Ok(raw) = std::fs::read_to_string(&path) {
            self.theme = Theme::parse(&raw);
        }
        self.theme_path = Some(path);
        self
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.theme = self.theme.toggled();
        if let Some(ref path) = self.theme_path {
            std::fs::write(path, self.theme.as_str())?;
        }
        Ok(self.theme)
    }

    /// Switching tabs invalidates whatever the old tab still has in
    /// flight.
    pub fn switch_tab(&mut self, tab: Tab) -> FetchTicket {
        self.active_tab = tab;
        self.begin_fetch(tab)
    }

    /// Issue a ticket for a new fetch of `tab`, superseding older ones.
    pub fn begin_fetch(&mut self, tab: Tab) -> FetchTicket {
        let slot = &mut self.generations[tab.index()];
        *slot += 1;
        FetchTicket {
            tab,
            generation: *slot,
        }
    }

    /// Whether a result arriving under `ticket` may still be applied.
    /// Stale results must be discarded by the caller.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generations[ticket.tab.index()] == ticket.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(dir: &tempfile::TempDir) -> AppState {
        let session = SessionFile::open_at(&dir.path().join("session_id"));
        AppState::new(session).with_theme_dir(dir.path())
    }

    #[test]
    fn latest_fetch_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);

        let old = state.begin_fetch(Tab::Chat);
        let new = state.begin_fetch(Tab::Chat);

        // The slow old fetch resolves after the newer one was issued.
        assert!(!state.is_current(old));
        assert!(state.is_current(new));
    }

    #[test]
    fn generations_are_per_tab() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);

        let chat = state.begin_fetch(Tab::Chat);
        let ranking = state.begin_fetch(Tab::Ranking);
        state.begin_fetch(Tab::Ranking);

        assert!(state.is_current(chat));
        assert!(!state.is_current(ranking));
    }

    #[test]
    fn switching_tabs_supersedes_in_flight_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);

        let pending = state.begin_fetch(Tab::Chat);
        state.switch_tab(Tab::Chat);
        assert!(!state.is_current(pending));
        assert_eq!(state.active_tab, Tab::Chat);
    }

    #[test]
    fn theme_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        assert_eq!(state.theme(), Theme::Light);

        state.toggle_theme().unwrap();
        assert_eq!(state.theme(), Theme::Dark);

        let reloaded = {
            let session = SessionFile::open_at(&dir.path().join("session_id"));
            AppState::new(session).with_theme_dir(dir.path())
        };
        assert_eq!(reloaded.theme(), Theme::Dark);
    }
}
