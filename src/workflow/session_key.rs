//! 会话键
//!
//! 封装"哪个用户在做哪个科目"这一信息

use std::fmt::Display;

/// 会话键，每个 (用户, 科目) 最多一个进行中的会话
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// 用户ID
    pub user_id: i64,

    /// 科目ID
    pub subject_id: i64,
}

impl SessionKey {
    pub fn new(user_id: i64, subject_id: i64) -> Self {
        Self {
            user_id,
            subject_id,
        }
    }
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[用户 {} 科目 {}]", self.user_id, self.subject_id)
    }
}
