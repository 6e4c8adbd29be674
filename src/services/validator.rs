//! 题目校验 - 业务能力层
//!
//! 把原始题目整理成合法的 `Question`：去空白、丢弃残缺题目、修正答案下标

use tracing::{debug, info};

use crate::models::{Question, RawQuestion};
use crate::services::segmenter::MIN_OPTIONS;

/// 校验单道题目，不合格时返回 None
pub fn validate_one(raw: RawQuestion) -> Option<Question> {
    let text = raw.text.trim();
    if text.is_empty() {
        return None;
    }

    let options: Vec<String> = raw
        .options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if options.len() < MIN_OPTIONS {
        return None;
    }

    let correct_index = if raw.correct_index < options.len() {
        raw.correct_index
    } else {
        0
    };

    Some(Question {
        text: text.to_string(),
        options,
        correct_index,
    })
}

/// 校验一组题目，保持原有顺序
///
/// 幂等：对已经校验过的题目再校验一次，结果不变。
pub fn validate<I>(raw: I) -> Vec<Question>
where
    I: IntoIterator<Item = RawQuestion>,
{
    let mut total = 0;
    let mut validated = Vec::new();

    for question in raw {
        total += 1;
        match validate_one(question) {
            Some(q) => validated.push(q),
            None => debug!("第 {} 题未通过校验", total),
        }
    }

    info!("校验通过 {}/{} 道题目", validated.len(), total);
    validated
}
