use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 测试会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 会话存储 / 成绩日志不可用
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文档解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 校验后一道有效题目都没有
    #[error("文档中没有找到有效题目 (科目: {subject_id})")]
    MalformedDocument { subject_id: i64 },
}

/// 测试会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 题库为空，无法抽题
    #[error("科目 {subject_id} 没有可用的题目")]
    NoQuestionsAvailable { subject_id: i64 },
    /// 找不到会话
    #[error("找不到测试会话 (用户: {user_id}, 科目: {subject_id})")]
    SessionNotFound { user_id: i64, subject_id: i64 },
    /// 选项位置超出本次展示的范围
    #[error("选项 {slot} 超出范围 [0, {option_count})")]
    InvalidSelection { slot: usize, option_count: usize },
    /// 当前题目已经作答
    #[error("第 {question_index} 题已经作答")]
    AlreadyAnswered { question_index: usize },
    /// 所有题目都已走完，只能结束测试
    #[error("没有待作答的题目 (用户: {user_id}, 科目: {subject_id})")]
    NoCurrentQuestion { user_id: i64, subject_id: i64 },
}

/// 存储错误，对当前操作是致命的，不做内部重试
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取会话失败
    #[error("读取会话失败 ({key}): {source}")]
    LoadFailed {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 保存会话失败
    #[error("保存会话失败 ({key}): {source}")]
    SaveFailed {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 删除会话失败
    #[error("删除会话失败 ({key}): {source}")]
    DeleteFailed {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入成绩日志失败
    #[error("写入成绩日志失败 ({path}): {source}")]
    ResultLogFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 科目不在目录中
    #[error("科目 {subject_id} 不存在")]
    UnknownSubject { subject_id: i64 },
    /// 无法解析抽题数量
    #[error("无法解析题目数量: '{value}'")]
    InvalidSampleSize { value: String },
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建会话不存在错误
    pub fn session_not_found(user_id: i64, subject_id: i64) -> Self {
        AppError::Session(SessionError::SessionNotFound {
            user_id,
            subject_id,
        })
    }

    /// 创建选项越界错误
    pub fn invalid_selection(slot: usize, option_count: usize) -> Self {
        AppError::Session(SessionError::InvalidSelection { slot, option_count })
    }

    /// 存储层是否不可用（调用方需要重试整个操作）
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, AppError::Store(_))
    }

    /// 是否可以通过重新开始测试恢复
    pub fn is_session_not_found(&self) -> bool {
        matches!(
            self,
            AppError::Session(SessionError::SessionNotFound { .. })
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_store_unavailable() {
        let err: AppError = StoreError::SaveFailed {
            key: "1:2".to_string(),
            source: Box::new(std::io::Error::other("disk full")),
        }
        .into();
        assert!(err.is_store_unavailable());
        assert!(!err.is_session_not_found());
    }

    #[test]
    fn test_session_not_found_message() {
        let err = AppError::session_not_found(7, 3);
        assert!(err.is_session_not_found());
        assert!(err.to_string().contains("用户: 7"));
    }
}
