use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AppError, ConfigError};
use crate::models::question::Question;

/// 一次作答记录，按打乱后的展示顺序计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 作答时所在的题目位置
    #[serde(default)]
    pub question_index: usize,
    pub question_text: String,
    pub selected_index: usize,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// 某个用户在某个科目下的测试会话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    pub subject_id: i64,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: Vec<AnswerRecord>,
    pub score: usize,
    pub total: usize,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// 创建新会话，`total` 等于抽到的题目数
    pub fn new(user_id: i64, user_name: impl Into<String>, subject_id: i64, questions: Vec<Question>) -> Self {
        let total = questions.len();
        Self {
            user_id,
            user_name: user_name.into(),
            subject_id,
            questions,
            current_index: 0,
            answers: Vec::new(),
            score: 0,
            total,
            created_at: Utc::now(),
        }
    }

    /// 当前题目，所有题目答完后为 None
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// 是否已经走到最后
    pub fn is_finished(&self) -> bool {
        self.current_index >= self.total
    }

    /// 当前题目是否已经作答
    pub fn current_answered(&self) -> bool {
        self.answers
            .iter()
            .any(|a| a.question_index == self.current_index)
    }
}

/// 抽题数量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// 随机抽取 n 道
    Count(usize),
    /// 整个题库，按题库顺序
    All,
}

impl SampleSize {
    /// 菜单中提供的选项
    pub const CHOICES: [SampleSize; 6] = [
        SampleSize::Count(10),
        SampleSize::Count(20),
        SampleSize::Count(30),
        SampleSize::Count(40),
        SampleSize::Count(60),
        SampleSize::All,
    ];
}

impl FromStr for SampleSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(SampleSize::All);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(SampleSize::Count(n)),
            _ => Err(ConfigError::InvalidSampleSize {
                value: s.to_string(),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for SampleSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleSize::Count(n) => write!(f, "{}", n),
            SampleSize::All => write!(f, "all"),
        }
    }
}
