//! Alarm list persistence.
//!
//! # Responsibility
//! - Load and save the full alarm collection as one unit.
//!
//! # Invariants
//! - A missing `alarms` key loads as an empty list.
//! - Every loaded alarm passes `Alarm::validate()`; ids are unique.

use crate::model::alarm::Alarm;
use crate::repo::kv_store::{KeyValueStore, ALARMS_KEY};
use crate::repo::{RepoError, RepoResult};
use std::collections::HashSet;

/// Repository interface for the alarm collection.
pub trait AlarmRepository {
    fn load_alarms(&self) -> RepoResult<Vec<Alarm>>;
    fn save_alarms(&self, alarms: &[Alarm]) -> RepoResult<()>;
}

/// Alarm repository storing a JSON list under the `alarms` key.
pub struct KvAlarmRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvAlarmRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> AlarmRepository for KvAlarmRepository<S> {
    fn load_alarms(&self) -> RepoResult<Vec<Alarm>> {
        let Some(raw) = self.store.get(ALARMS_KEY)? else {
            return Ok(Vec::new());
        };
        let alarms: Vec<Alarm> = serde_json::from_str(&raw)?;

        let mut seen = HashSet::with_capacity(alarms.len());
        for alarm in &alarms {
            alarm.validate()?;
            if !seen.insert(alarm.id) {
                return Err(RepoError::InvalidData(format!(
                    "duplicate alarm id `{}` in `{ALARMS_KEY}`",
                    alarm.id
                )));
            }
        }
        Ok(alarms)
    }

    fn save_alarms(&self, alarms: &[Alarm]) -> RepoResult<()> {
        let raw = serde_json::to_string(alarms)?;
        self.store.put(ALARMS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{AlarmRepository, KvAlarmRepository};
    use crate::db::open_db_in_memory;
    use crate::model::alarm::{Alarm, AlarmDraft, AlarmTime};
    use crate::repo::kv_store::{KeyValueStore, SqliteKeyValueStore, ALARMS_KEY};
    use crate::repo::RepoError;

    fn repo() -> KvAlarmRepository<SqliteKeyValueStore> {
        KvAlarmRepository::new(SqliteKeyValueStore::new(
            open_db_in_memory().expect("open db"),
        ))
    }

    #[test]
    fn missing_key_loads_empty_list() {
        assert!(repo().load_alarms().expect("load").is_empty());
    }

    #[test]
    fn saved_alarms_load_back_with_all_fields() {
        let repo = repo();
        let mut alarm = Alarm::from_draft(
            &AlarmDraft::at(AlarmTime::new(6, 45).expect("valid"))
                .titled("Gym")
                .with_sound("chime")
                .repeating(true),
        )
        .expect("valid draft");
        alarm.is_active = false;

        repo.save_alarms(std::slice::from_ref(&alarm)).expect("save");
        assert_eq!(repo.load_alarms().expect("load"), vec![alarm]);
    }

    #[test]
    fn persisted_shape_uses_time_string_and_camel_case() {
        let repo = repo();
        let alarm = Alarm::from_draft(&AlarmDraft::at(AlarmTime::new(7, 0).expect("valid")))
            .expect("valid draft");
        repo.save_alarms(&[alarm]).expect("save");

        let raw = repo.store().get(ALARMS_KEY).expect("get").expect("present");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json[0]["time"], "07:00");
        assert_eq!(json[0]["isActive"], true);
        assert_eq!(json[0]["repeat"], false);
    }

    #[test]
    fn malformed_time_is_rejected_on_load() {
        let repo = repo();
        repo.store()
            .put(
                ALARMS_KEY,
                r#"[{"id":"6f1c4c0e-8c4b-4f57-9d1f-0b0d3d6c9a10","time":"31:00","title":"x","isActive":true,"repeat":false}]"#,
            )
            .expect("put");
        assert!(matches!(
            repo.load_alarms().unwrap_err(),
            RepoError::Serialization(_)
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected_on_load() {
        let repo = repo();
        let alarm = Alarm::from_draft(&AlarmDraft::at(AlarmTime::new(7, 0).expect("valid")))
            .expect("valid draft");
        repo.save_alarms(&[alarm.clone(), alarm]).expect("save");
        assert!(matches!(
            repo.load_alarms().unwrap_err(),
            RepoError::InvalidData(_)
        ));
    }
}
