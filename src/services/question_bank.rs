//! 题库服务 - 业务能力层
//!
//! 负责把科目文档解析成题库，并在进程内缓存
//!
//! 缓存没有失效机制：文档更新后需要重启进程才能生效。

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::{AppResult, ParseError};
use crate::infrastructure::TextSource;
use crate::models::{Question, Subject};
use crate::services::segmenter::{analyze, segment_with_report};
use crate::services::validator::validate;

/// 单个科目的题库槽位，构建期间持有槽位锁
type BankSlot = Arc<Mutex<Option<Arc<Vec<Question>>>>>;

/// 题库缓存
///
/// 以科目 id 为键，每个科目一个槽位。外层表锁只在查找槽位时持有，
/// 同一科目的并发首次访问在槽位上排队并复用构建结果，
/// 其他科目的读取和构建不受影响。
#[derive(Default)]
pub struct QuestionBankCache {
    banks: Mutex<HashMap<i64, BankSlot>>,
}

impl QuestionBankCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取题库，不存在时调用 `builder` 构建
    ///
    /// 构建失败时不缓存任何内容，下一次访问会重新构建。
    pub fn get_or_build<F>(&self, subject_id: i64, builder: F) -> AppResult<Arc<Vec<Question>>>
    where
        F: FnOnce() -> AppResult<Vec<Question>>,
    {
        let slot = self.slot(subject_id);
        let mut cached = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bank) = cached.as_ref() {
            debug!("命中题库缓存: 科目 {}", subject_id);
            return Ok(Arc::clone(bank));
        }

        let bank = Arc::new(builder()?);
        *cached = Some(Arc::clone(&bank));
        Ok(bank)
    }

    /// 只读取已缓存的题库
    pub fn get(&self, subject_id: i64) -> Option<Arc<Vec<Question>>> {
        let slot = self
            .banks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&subject_id)
            .cloned()?;
        let cached = slot.lock().unwrap_or_else(|e| e.into_inner());
        cached.clone()
    }

    pub fn contains(&self, subject_id: i64) -> bool {
        self.get(subject_id).is_some()
    }

    fn slot(&self, subject_id: i64) -> BankSlot {
        let mut banks = self.banks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(banks.entry(subject_id).or_default())
    }
}

/// 解析一个科目的文档：分段 → 校验
///
/// 一道有效题目都没有时返回 `MalformedDocument`。
pub fn build_bank(source: &dyn TextSource, subject: &Subject) -> AppResult<Vec<Question>> {
    let path = Path::new(&subject.file_path);
    info!("📖 正在解析科目文档: {} ({})", subject.name, path.display());

    let report = segment_with_report(source.lines(path)?);
    let raw_count = report.questions.len();
    let questions = validate(report.questions);

    info!(
        "✓ 科目 {} 解析完成: {} 道题目 (原始 {}, 丢弃 {})",
        subject.name,
        questions.len(),
        raw_count,
        report.discarded
    );

    if questions.is_empty() {
        log_document_stats(source, path);
        return Err(ParseError::MalformedDocument {
            subject_id: subject.id,
        }
        .into());
    }

    Ok(questions)
}

/// 解析失败时输出文档结构，便于排查格式问题
fn log_document_stats(source: &dyn TextSource, path: &Path) {
    let lines = match source.lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            warn!("无法重新读取文档 {}: {}", path.display(), e);
            return;
        }
    };

    let stats = analyze(lines);
    warn!(
        "⚠️ 文档中没有找到题目: {} 行, 非空 {}, 疑似题目 {}, 疑似选项 {}",
        stats.total_lines, stats.non_empty_lines, stats.question_like, stats.option_like
    );
    for line in &stats.sample_lines {
        debug!("  {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::infrastructure::MemoryTextSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn question(text: &str) -> Question {
        Question {
            text: text.to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 0,
        }
    }

    fn subject(id: i64, file: &str) -> Subject {
        Subject {
            id,
            name: format!("subject-{}", id),
            file_path: file.to_string(),
        }
    }

    #[test]
    fn test_build_bank_from_lines() {
        let source = MemoryTextSource::new().with_document(
            "math.txt",
            ["1. What is 2+2?", "A) 3", "B) 4", "2) Next", "A. X"],
        );
        let bank = build_bank(&source, &subject(1, "math.txt")).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].options, vec!["3", "4"]);
    }

    #[test]
    fn test_build_bank_without_questions_is_malformed() {
        let source = MemoryTextSource::new().with_document("empty.txt", ["just prose", "", "more"]);
        let err = build_bank(&source, &subject(2, "empty.txt")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Parse(ParseError::MalformedDocument { subject_id: 2 })
        ));
    }

    #[test]
    fn test_cache_builds_once() {
        let cache = QuestionBankCache::new();
        let calls = AtomicUsize::new(0);
        let build = || -> AppResult<Vec<Question>> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Question {
                text: "q".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_index: 0,
            }])
        };

        let first = cache.get_or_build(1, build).unwrap();
        let second = cache.get_or_build(1, build).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = QuestionBankCache::new();
        let err = cache
            .get_or_build(3, || Err(ParseError::MalformedDocument { subject_id: 3 }.into()))
            .unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(!cache.contains(3));
    }

    #[test]
    fn test_cached_subject_is_readable_while_another_builds() {
        use std::sync::mpsc;
        use std::time::Duration;

        let cache = Arc::new(QuestionBankCache::new());
        cache.get_or_build(2, || Ok(vec![question("cached")])).unwrap();

        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let builder_cache = Arc::clone(&cache);
        let handle = std::thread::spawn(move || {
            let mut released = false;
            builder_cache
                .get_or_build(1, || {
                    started_tx.send(()).unwrap();
                    released = release_rx.recv_timeout(Duration::from_secs(5)).is_ok();
                    Ok(vec![question("slow")])
                })
                .unwrap();
            released
        });

        started_rx.recv().unwrap();
        let other = cache
            .get_or_build(2, || panic!("科目 2 已经缓存"))
            .unwrap();
        assert_eq!(other[0].text, "cached");
        let _ = release_tx.send(());

        // 科目 1 构建期间科目 2 的读取已经返回
        assert!(handle.join().unwrap());
        assert!(cache.contains(1));
    }

    #[test]
    fn test_failed_build_is_retried() {
        let cache = QuestionBankCache::new();
        assert!(cache
            .get_or_build(4, || Err(ParseError::MalformedDocument { subject_id: 4 }.into()))
            .is_err());
        let bank = cache.get_or_build(4, || Ok(vec![question("second")])).unwrap();
        assert_eq!(bank[0].text, "second");
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let cache = Arc::new(QuestionBankCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache
                        .get_or_build(9, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(vec![Question {
                                text: "q".to_string(),
                                options: vec!["a".to_string(), "b".to_string()],
                                correct_index: 0,
                            }])
                        })
                        .map(|bank| bank.len())
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
