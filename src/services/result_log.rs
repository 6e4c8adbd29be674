//! 成绩日志 - 业务能力层
//!
//! 只负责"追加一行成绩"能力，不关心流程

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{AppResult, StoreError};
use crate::models::QuizResult;

/// 成绩日志
///
/// 职责：
/// - 每次测试结束追加一行
/// - 已写入的记录不修改、不删除
pub trait ResultLog: Send + Sync {
    fn append(&self, result: &QuizResult) -> AppResult<()>;

    /// 读取全部记录（用于统计）
    fn read_all(&self) -> AppResult<Vec<QuizResult>>;
}

/// JSON Lines 文件成绩日志
pub struct JsonlResultLog {
    path: String,
}

impl JsonlResultLog {
    /// 创建新的成绩日志
    pub fn new() -> Self {
        Self {
            path: "results.jsonl".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn failed(&self, source: impl std::error::Error + Send + Sync + 'static) -> StoreError {
        StoreError::ResultLogFailed {
            path: self.path.clone(),
            source: Box::new(source),
        }
    }
}

impl Default for JsonlResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLog for JsonlResultLog {
    /// 追加成绩
    ///
    /// # 参数
    /// - `result`: 一次完成的测试
    fn append(&self, result: &QuizResult) -> AppResult<()> {
        debug!(
            "写入成绩: 用户 {} | 科目 {} | {}/{}",
            result.user_id, result.subject_id, result.score, result.total
        );

        let line = serde_json::to_string(result).map_err(|e| self.failed(e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.failed(e))?;

        writeln!(file, "{}", line).map_err(|e| self.failed(e))?;

        Ok(())
    }

    fn read_all(&self) -> AppResult<Vec<QuizResult>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.failed(e).into()),
        };

        let mut results = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<QuizResult>(line) {
                Ok(result) => results.push(result),
                Err(e) => warn!("跳过无法解析的成绩记录 (第 {} 行): {}", i + 1, e),
            }
        }

        Ok(results)
    }
}

/// 内存成绩日志
#[derive(Default)]
pub struct MemoryResultLog {
    results: Mutex<Vec<QuizResult>>,
}

impl MemoryResultLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultLog for MemoryResultLog {
    fn append(&self, result: &QuizResult) -> AppResult<()> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result.clone());
        Ok(())
    }

    fn read_all(&self) -> AppResult<Vec<QuizResult>> {
        Ok(self
            .results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(user_id: i64, score: usize) -> QuizResult {
        QuizResult {
            user_id,
            user_name: "Ali".to_string(),
            subject_id: 1,
            score,
            total: 4,
            percentage: QuizResult::percentage_of(score, 4),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_jsonl_log_appends() {
        let path = std::env::temp_dir().join(format!("quiz_bank_results_{}.jsonl", std::process::id()));
        let _ = fs::remove_file(&path);
        let log = JsonlResultLog::with_path(path.to_string_lossy());

        assert!(log.read_all().unwrap().is_empty());

        log.append(&result(1, 3)).unwrap();
        log.append(&result(2, 4)).unwrap();

        let all = log.read_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].percentage, 75.0);
        assert_eq!(all[1].user_id, 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unwritable_log_is_store_unavailable() {
        let log = JsonlResultLog::with_path("/nonexistent-dir/quiz/results.jsonl");
        let err = log.append(&result(1, 1)).unwrap_err();
        assert!(err.is_store_unavailable());
    }
}
