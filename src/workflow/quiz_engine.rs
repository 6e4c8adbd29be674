//! 测试流程 - 流程层
//!
//! 核心职责：定义"一次测试"的完整状态机
//!
//! 状态：无会话 → 进行中 → 已完成（会话被删除，等同于无会话）
//!
//! 每个操作只读写自己的 (用户, 科目) 会话，不同会话之间互不影响。

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, SessionError};
use crate::infrastructure::{SessionStore, TextSource};
use crate::models::{
    AnswerRecord, QuizReport, QuizResult, SampleSize, Session, Subject, UserStats,
};
use crate::services::{build_bank, QuestionBankCache, ResultLog};
use crate::workflow::session_key::SessionKey;

/// 一次题目展示
///
/// 选项已经打乱，`slot_to_original[slot]` 是该位置选项在原题中的下标。
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// 第几题（从 1 开始）
    pub position: usize,
    pub total: usize,
    pub question_text: String,
    pub options: Vec<String>,
    pub slot_to_original: Vec<usize>,
    /// 正确答案在本次展示中的位置
    pub correct_slot: usize,
}

impl Presentation {
    /// 选项位置对应的字母，0 → A
    pub fn letter(slot: usize) -> char {
        (b'A' + (slot % 26) as u8) as char
    }

    /// 字母转回选项位置，超出本次展示范围时返回 None
    pub fn slot_of(&self, letter: char) -> Option<usize> {
        let upper = letter.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        let slot = (upper as u8 - b'A') as usize;
        (slot < self.options.len()).then_some(slot)
    }
}

/// `present_current` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// 还有题目要答
    Question(Presentation),
    /// 所有题目已走完，测试已结束
    Completed(QuizReport),
}

/// 一次作答的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_slot: usize,
    pub score: usize,
    pub total: usize,
}

/// 测试引擎
///
/// - 持有题库缓存，首次访问科目时解析文档
/// - 会话状态全部放在 `SessionStore` 中，引擎本身不保存会话
/// - 只追加成绩，不修改已写入的记录
pub struct QuizEngine<S, L> {
    store: S,
    results: L,
    source: Box<dyn TextSource>,
    banks: Arc<QuestionBankCache>,
    rng: Mutex<StdRng>,
}

impl<S: SessionStore, L: ResultLog> QuizEngine<S, L> {
    /// 创建新的测试引擎
    pub fn new(
        store: S,
        results: L,
        source: impl TextSource + 'static,
        banks: Arc<QuestionBankCache>,
    ) -> Self {
        Self::with_rng(store, results, source, banks, StdRng::from_entropy())
    }

    /// 使用固定随机种子创建（抽题和打乱结果可复现）
    pub fn with_seed(
        store: S,
        results: L,
        source: impl TextSource + 'static,
        banks: Arc<QuestionBankCache>,
        seed: u64,
    ) -> Self {
        Self::with_rng(store, results, source, banks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        store: S,
        results: L,
        source: impl TextSource + 'static,
        banks: Arc<QuestionBankCache>,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            results,
            source: Box::new(source),
            banks,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn result_log(&self) -> &L {
        &self.results
    }

    pub fn banks(&self) -> &QuestionBankCache {
        &self.banks
    }

    /// 开始测试
    ///
    /// 覆盖同一 (用户, 科目) 下已有的会话。
    /// `SampleSize::All` 按题库顺序取全部题目，否则无放回随机抽取 `min(n, 题库大小)` 道。
    pub fn start_session(
        &self,
        user_id: i64,
        user_name: &str,
        subject: &Subject,
        sample: SampleSize,
    ) -> AppResult<Session> {
        let key = SessionKey::new(user_id, subject.id);

        let bank = self
            .banks
            .get_or_build(subject.id, || build_bank(self.source.as_ref(), subject))?;

        let questions = match sample {
            SampleSize::All => bank.to_vec(),
            SampleSize::Count(requested) => {
                let amount = requested.min(bank.len());
                let mut rng = self.lock_rng();
                index::sample(&mut *rng, bank.len(), amount)
                    .into_iter()
                    .map(|i| bank[i].clone())
                    .collect()
            }
        };

        if questions.is_empty() {
            return Err(SessionError::NoQuestionsAvailable {
                subject_id: subject.id,
            }
            .into());
        }

        let session = Session::new(user_id, user_name, subject.id, questions);
        self.store.save(&session)?;

        info!(
            "{} 🚀 开始测试: {} | {} 道题目 (题库 {} 道, 请求 {})",
            key,
            subject.name,
            session.total,
            bank.len(),
            sample
        );

        Ok(session)
    }

    /// 展示当前题目
    ///
    /// 每次调用都重新打乱选项，不写回会话。题目走完时直接结束测试。
    pub fn present_current(&self, user_id: i64, subject_id: i64) -> AppResult<Step> {
        let key = SessionKey::new(user_id, subject_id);
        let session = self.load(&key)?;

        let Some(question) = session.current_question() else {
            return self.finalize_session(&key, session).map(Step::Completed);
        };

        let mut slot_to_original: Vec<usize> = (0..question.options.len()).collect();
        slot_to_original.shuffle(&mut *self.lock_rng());

        let options = slot_to_original
            .iter()
            .map(|&i| question.options[i].clone())
            .collect();
        let correct_slot = slot_to_original
            .iter()
            .position(|&i| i == question.correct_index)
            .unwrap_or(0);

        debug!(
            "{} 第 {}/{} 题, 选项顺序 {:?}",
            key,
            session.current_index + 1,
            session.total,
            slot_to_original
        );

        Ok(Step::Question(Presentation {
            position: session.current_index + 1,
            total: session.total,
            question_text: question.text.clone(),
            options,
            slot_to_original,
            correct_slot,
        }))
    }

    /// 提交答案
    ///
    /// 只记录结果，不前进到下一题。两个位置都必须落在本题选项范围内，
    /// 同一题只能作答一次。
    pub fn submit_answer(
        &self,
        user_id: i64,
        subject_id: i64,
        selected_slot: usize,
        presented_correct_slot: usize,
    ) -> AppResult<AnswerOutcome> {
        let key = SessionKey::new(user_id, subject_id);
        let mut session = self.load(&key)?;

        let question = session
            .current_question()
            .ok_or(SessionError::NoCurrentQuestion {
                user_id,
                subject_id,
            })?;

        let option_count = question.options.len();
        for slot in [selected_slot, presented_correct_slot] {
            if slot >= option_count {
                warn!("{} ⚠️ 选项 {} 超出范围 (共 {} 个)", key, slot, option_count);
                return Err(AppError::invalid_selection(slot, option_count));
            }
        }

        if session.current_answered() {
            return Err(SessionError::AlreadyAnswered {
                question_index: session.current_index,
            }
            .into());
        }

        let is_correct = selected_slot == presented_correct_slot;
        let record = AnswerRecord {
            question_index: session.current_index,
            question_text: question.text.clone(),
            selected_index: selected_slot,
            correct_index: presented_correct_slot,
            is_correct,
        };

        session.answers.push(record);
        if is_correct {
            session.score += 1;
        }
        self.store.save(&session)?;

        debug!(
            "{} 第 {} 题: {} (得分 {}/{})",
            key,
            session.current_index + 1,
            if is_correct { "正确" } else { "错误" },
            session.score,
            session.total
        );

        Ok(AnswerOutcome {
            is_correct,
            correct_slot: presented_correct_slot,
            score: session.score,
            total: session.total,
        })
    }

    /// 前进到下一题
    ///
    /// 已经走到最后时不再增加。
    pub fn advance(&self, user_id: i64, subject_id: i64) -> AppResult<Session> {
        let key = SessionKey::new(user_id, subject_id);
        let mut session = self.load(&key)?;

        if session.is_finished() {
            debug!("{} 已经是最后一题之后，不再前进", key);
            return Ok(session);
        }

        session.current_index += 1;
        self.store.save(&session)?;
        Ok(session)
    }

    /// 结束测试：写入成绩，删除会话
    pub fn finalize(&self, user_id: i64, subject_id: i64) -> AppResult<QuizReport> {
        let key = SessionKey::new(user_id, subject_id);
        let session = self.load(&key)?;
        self.finalize_session(&key, session)
    }

    /// 删除用户的所有会话，不写成绩
    pub fn cancel_all(&self, user_id: i64) -> AppResult<usize> {
        let removed = self.store.delete_all_for_user(user_id)?;
        info!("[用户 {}] 已取消 {} 个进行中的测试", user_id, removed);
        Ok(removed)
    }

    /// 读取会话（不修改）
    pub fn session(&self, user_id: i64, subject_id: i64) -> AppResult<Session> {
        self.load(&SessionKey::new(user_id, subject_id))
    }

    /// 用户的历史成绩统计
    pub fn user_stats(&self, user_id: i64) -> AppResult<UserStats> {
        let all = self.results.read_all()?;
        Ok(UserStats::from_results(user_id, &all))
    }

    fn finalize_session(&self, key: &SessionKey, session: Session) -> AppResult<QuizReport> {
        let result = QuizResult {
            user_id: session.user_id,
            user_name: session.user_name.clone(),
            subject_id: session.subject_id,
            score: session.score,
            total: session.total,
            percentage: QuizResult::percentage_of(session.score, session.total),
            timestamp: chrono::Utc::now(),
        };

        self.results.append(&result)?;
        self.store.delete(key.user_id, key.subject_id)?;

        let report = QuizReport::new(result);
        info!(
            "{} 🏁 测试结束: {}/{} ({:.1}%) {}",
            key, report.result.score, report.result.total, report.result.percentage, report.grade
        );

        Ok(report)
    }

    fn load(&self, key: &SessionKey) -> AppResult<Session> {
        self.store
            .load(key.user_id, key.subject_id)?
            .ok_or_else(|| AppError::session_not_found(key.user_id, key.subject_id))
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}
