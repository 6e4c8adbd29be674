use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::grade::Grade;

/// 成绩日志中的一行，只追加，不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub user_id: i64,
    pub user_name: String,
    pub subject_id: i64,
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub timestamp: DateTime<Utc>,
}

impl QuizResult {
    /// 百分比保留一位小数，`total == 0` 时为 0
    pub fn percentage_of(score: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        (score as f64 / total as f64 * 1000.0).round() / 10.0
    }
}

/// 测试结束时给用户的报告
#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    pub result: QuizResult,
    pub grade: Grade,
    pub wrong: usize,
}

impl QuizReport {
    pub fn new(result: QuizResult) -> Self {
        let grade = Grade::from_percentage(result.percentage);
        let wrong = result.total - result.score;
        Self {
            result,
            grade,
            wrong,
        }
    }
}

/// 某个用户的历史统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserStats {
    pub tests_taken: usize,
    pub best_percentage: f64,
    pub average_percentage: f64,
}

impl UserStats {
    pub fn from_results(user_id: i64, results: &[QuizResult]) -> Self {
        let own: Vec<f64> = results
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.percentage)
            .collect();

        if own.is_empty() {
            return Self::default();
        }

        let best = own.iter().cloned().fold(0.0_f64, f64::max);
        let average = own.iter().sum::<f64>() / own.len() as f64;

        Self {
            tests_taken: own.len(),
            best_percentage: best,
            average_percentage: (average * 10.0).round() / 10.0,
        }
    }
}
