use serde::{Deserialize, Serialize};

/// 分段器产出的原始题目，尚未校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// 校验后的选择题
///
/// 不变式：`options.len() >= 2` 且 `correct_index < options.len()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    /// 正确选项的文本
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

impl From<Question> for RawQuestion {
    fn from(q: Question) -> Self {
        Self {
            text: q.text,
            options: q.options,
            correct_index: q.correct_index,
        }
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便显示（最多80个字符）
        let preview = if self.text.chars().count() > 80 {
            self.text.chars().take(80).collect::<String>() + "..."
        } else {
            self.text.clone()
        };
        write!(f, "{} [{} 个选项]", preview, self.options.len())
    }
}
