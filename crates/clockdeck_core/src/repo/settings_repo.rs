//! Clock settings persistence.

use crate::model::settings::ClockSettings;
use crate::repo::kv_store::{KeyValueStore, CLOCK_SETTINGS_KEY};
use crate::repo::RepoResult;

/// Repository interface for clock settings.
pub trait SettingsRepository {
    /// Returns `None` when nothing was saved yet.
    fn load_settings(&self) -> RepoResult<Option<ClockSettings>>;
    fn save_settings(&self, settings: &ClockSettings) -> RepoResult<()>;
}

/// Settings repository storing JSON under the `clockSettings` key.
pub struct KvSettingsRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvSettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> SettingsRepository for KvSettingsRepository<S> {
    fn load_settings(&self) -> RepoResult<Option<ClockSettings>> {
        match self.store.get(CLOCK_SETTINGS_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_settings(&self, settings: &ClockSettings) -> RepoResult<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.put(CLOCK_SETTINGS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{KvSettingsRepository, SettingsRepository};
    use crate::db::open_db_in_memory;
    use crate::model::settings::{ClockSettings, ColorTheme, FontSize};
    use crate::repo::kv_store::SqliteKeyValueStore;

    #[test]
    fn settings_roundtrip_including_enums() {
        let repo = KvSettingsRepository::new(SqliteKeyValueStore::new(
            open_db_in_memory().expect("open db"),
        ));
        assert_eq!(repo.load_settings().expect("load"), None);

        let settings = ClockSettings {
            is_24_hour: true,
            show_seconds: false,
            show_date: false,
            digital_font: false,
            font_size: FontSize::Small,
            color_theme: ColorTheme::Orange,
        };
        repo.save_settings(&settings).expect("save");
        assert_eq!(repo.load_settings().expect("load"), Some(settings));
    }
}
