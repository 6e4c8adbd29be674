//! 会话存储 - 基础设施层
//!
//! 以 (用户, 科目) 为键保存测试会话，只提供读 / 写 / 删的能力

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{AppResult, StoreError};
use crate::models::Session;

/// 会话存储
///
/// 职责：
/// - 每个 (user_id, subject_id) 最多一个会话，保存即覆盖
/// - 失败统一报 `StoreError`，不做重试
pub trait SessionStore: Send + Sync {
    fn load(&self, user_id: i64, subject_id: i64) -> AppResult<Option<Session>>;

    fn save(&self, session: &Session) -> AppResult<()>;

    /// 删除会话，返回是否真的删除了
    fn delete(&self, user_id: i64, subject_id: i64) -> AppResult<bool>;

    /// 删除某个用户的全部会话，返回删除数量
    fn delete_all_for_user(&self, user_id: i64) -> AppResult<usize>;
}

fn store_key(user_id: i64, subject_id: i64) -> String {
    format!("{}_{}", user_id, subject_id)
}

/// 基于目录的会话存储，每个会话一个 JSON 文件
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// 创建存储，目录不存在时自动创建
    pub fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::SaveFailed {
            key: dir.display().to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: i64, subject_id: i64) -> PathBuf {
        self.dir
            .join(format!("{}.json", store_key(user_id, subject_id)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, user_id: i64, subject_id: i64) -> AppResult<Option<Session>> {
        let path = self.path_for(user_id, subject_id);
        if !path.exists() {
            return Ok(None);
        }

        let key = store_key(user_id, subject_id);
        let content = fs::read_to_string(&path).map_err(|e| StoreError::LoadFailed {
            key: key.clone(),
            source: Box::new(e),
        })?;
        let session: Session = serde_json::from_str(&content).map_err(|e| StoreError::LoadFailed {
            key,
            source: Box::new(e),
        })?;

        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> AppResult<()> {
        let key = store_key(session.user_id, session.subject_id);
        let json = serde_json::to_string_pretty(session).map_err(|e| StoreError::SaveFailed {
            key: key.clone(),
            source: Box::new(e),
        })?;

        // 先写临时文件再改名，避免留下半个会话
        let path = self.path_for(session.user_id, session.subject_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| StoreError::SaveFailed {
                key: key.clone(),
                source: Box::new(e),
            })?;

        debug!("会话已保存: {}", key);
        Ok(())
    }

    fn delete(&self, user_id: i64, subject_id: i64) -> AppResult<bool> {
        let path = self.path_for(user_id, subject_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| StoreError::DeleteFailed {
            key: store_key(user_id, subject_id),
            source: Box::new(e),
        })?;
        Ok(true)
    }

    fn delete_all_for_user(&self, user_id: i64) -> AppResult<usize> {
        let prefix = format!("{}_", user_id);
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::DeleteFailed {
            key: prefix.clone(),
            source: Box::new(e),
        })?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::DeleteFailed {
                key: prefix.clone(),
                source: Box::new(e),
            })?;
            let path = entry.path();
            let is_session = path.extension().and_then(|s| s.to_str()) == Some("json");
            let owned = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|stem| stem.starts_with(&prefix))
                .unwrap_or(false);

            if is_session && owned {
                fs::remove_file(&path).map_err(|e| StoreError::DeleteFailed {
                    key: prefix.clone(),
                    source: Box::new(e),
                })?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

/// 内存会话存储
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<(i64, i64), Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(i64, i64), Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, user_id: i64, subject_id: i64) -> AppResult<Option<Session>> {
        Ok(self.lock().get(&(user_id, subject_id)).cloned())
    }

    fn save(&self, session: &Session) -> AppResult<()> {
        self.lock()
            .insert((session.user_id, session.subject_id), session.clone());
        Ok(())
    }

    fn delete(&self, user_id: i64, subject_id: i64) -> AppResult<bool> {
        Ok(self.lock().remove(&(user_id, subject_id)).is_some())
    }

    fn delete_all_for_user(&self, user_id: i64) -> AppResult<usize> {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|(owner, _), _| *owner != user_id);
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn session(user_id: i64, subject_id: i64) -> Session {
        Session::new(
            user_id,
            "user",
            subject_id,
            vec![Question {
                text: "q".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_index: 0,
            }],
        )
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("quiz_bank_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_file_store_round_trip_and_overwrite() {
        let dir = scratch_dir("store_round_trip");
        let store = FileSessionStore::new(&dir).unwrap();

        let mut s = session(1, 2);
        store.save(&s).unwrap();
        assert_eq!(store.load(1, 2).unwrap(), Some(s.clone()));

        s.current_index = 1;
        s.score = 1;
        store.save(&s).unwrap();
        assert_eq!(store.load(1, 2).unwrap().unwrap().score, 1);

        assert!(store.delete(1, 2).unwrap());
        assert!(!store.delete(1, 2).unwrap());
        assert_eq!(store.load(1, 2).unwrap(), None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_delete_all_for_user_keeps_other_users() {
        let dir = scratch_dir("store_delete_all");
        let store = FileSessionStore::new(&dir).unwrap();
        store.save(&session(1, 1)).unwrap();
        store.save(&session(1, 2)).unwrap();
        store.save(&session(11, 1)).unwrap();

        assert_eq!(store.delete_all_for_user(1).unwrap(), 2);
        assert!(store.load(11, 1).unwrap().is_some());
        assert_eq!(store.delete_all_for_user(1).unwrap(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_corrupt_session_is_store_error() {
        let dir = scratch_dir("store_corrupt");
        let store = FileSessionStore::new(&dir).unwrap();
        fs::write(dir.join("3_4.json"), "{not json").unwrap();

        let err = store.load(3, 4).unwrap_err();
        assert!(err.is_store_unavailable());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        store.save(&session(1, 1)).unwrap();
        store.save(&session(1, 2)).unwrap();
        store.save(&session(2, 1)).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.delete_all_for_user(1).unwrap(), 2);
        assert_eq!(store.len(), 1);
    }
}
