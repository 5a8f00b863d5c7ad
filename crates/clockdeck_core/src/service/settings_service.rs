//! Clock settings use-case service.
//!
//! # Invariants
//! - `settings()` always returns a usable value; load failures fall back to
//!   defaults for the session.
//! - Updates apply in memory first; saving is best-effort.

use crate::model::settings::ClockSettings;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::fmt::{Display, Formatter};

/// Best-effort persistence failure for settings.
#[derive(Debug)]
pub enum SettingsWarning {
    LoadFailed(RepoError),
    SaveFailed(RepoError),
}

impl Display for SettingsWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed(err) => write!(f, "loading clock settings failed: {err}"),
            Self::SaveFailed(err) => write!(f, "saving clock settings failed: {err}"),
        }
    }
}

/// Settings owner backed by a repository.
pub struct SettingsService<R: SettingsRepository> {
    repo: R,
    current: ClockSettings,
}

impl<R: SettingsRepository> SettingsService<R> {
    /// Loads persisted settings, falling back to defaults.
    pub fn load(repo: R) -> (Self, Option<SettingsWarning>) {
        let (current, warning) = match repo.load_settings() {
            Ok(Some(settings)) => (settings, None),
            Ok(None) => (ClockSettings::default(), None),
            Err(err) => {
                error!(
                    "event=settings_load module=settings status=error error_code=persistence_failed error={}",
                    err
                );
                (ClockSettings::default(), Some(SettingsWarning::LoadFailed(err)))
            }
        };
        (Self { repo, current }, warning)
    }

    pub fn settings(&self) -> ClockSettings {
        self.current
    }

    /// Applies `edit` and saves the result.
    pub fn update(
        &mut self,
        edit: impl FnOnce(&mut ClockSettings),
    ) -> (ClockSettings, Option<SettingsWarning>) {
        edit(&mut self.current);
        (self.current, self.save())
    }

    /// Replaces all settings and saves them.
    pub fn replace(&mut self, settings: ClockSettings) -> Option<SettingsWarning> {
        self.current = settings;
        self.save()
    }

    fn save(&self) -> Option<SettingsWarning> {
        match self.repo.save_settings(&self.current) {
            Ok(()) => {
                info!(
                    "event=settings_save module=settings status=ok is_24_hour={} show_seconds={}",
                    self.current.is_24_hour, self.current.show_seconds
                );
                None
            }
            Err(err) => {
                error!(
                    "event=settings_save module=settings status=error error_code=persistence_failed error={}",
                    err
                );
                Some(SettingsWarning::SaveFailed(err))
            }
        }
    }
}
