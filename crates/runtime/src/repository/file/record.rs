//! File-based [`BattleRecordRepository`].

use std::fs;
use std::path::{Path, PathBuf};

use battle_core::BattleId;

use crate::repository::error::Result;
use crate::repository::{BattleRecord, BattleRecordRepository, RepositoryError};

/// Stores each finished battle as `record_{id}.json`.
///
/// Writes go to a temp file first and are renamed into place, so a record is
/// either fully present or absent.
pub struct FileRecordRepository {
    base_dir: PathBuf,
}

impl FileRecordRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, id: BattleId) -> PathBuf {
        self.base_dir.join(format!("record_{}.json", id.0))
    }
}

impl BattleRecordRepository for FileRecordRepository {
    fn save(&self, record: &BattleRecord) -> Result<()> {
        let path = self.record_path(record.battle_id);
        if path.exists() {
            return Err(RepositoryError::AlreadyExists(record.battle_id));
        }

        let bytes =
            serde_json::to_vec_pretty(record).map_err(|e| RepositoryError::Json(e.to_string()))?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "runtime::repository",
            battle = %record.battle_id,
            path = %path.display(),
            "saved battle record"
        );
        Ok(())
    }

    fn load(&self, id: BattleId) -> Result<Option<BattleRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let record = serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Json(e.to_string()))?;
        Ok(Some(record))
    }

    fn list(&self) -> Result<Vec<BattleRecord>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename
                    .strip_prefix("record_")
                    .and_then(|s| s.strip_suffix(".json"))
                && let Ok(id) = id.parse::<u64>()
            {
                ids.push(BattleId(id));
            }
        }
        ids.sort_unstable();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.load(id)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
