use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ConfigError};

/// 科目：一个题库文档对应一个科目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    /// 题库文档路径（已经转成纯文本的文件）
    pub file_path: String,
}

/// 科目目录 (subjects.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectCatalog {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl SubjectCatalog {
    /// 按 id 查找科目
    pub fn get(&self, subject_id: i64) -> AppResult<&Subject> {
        self.subjects
            .iter()
            .find(|s| s.id == subject_id)
            .ok_or_else(|| ConfigError::UnknownSubject { subject_id }.into())
    }

    /// 按 id 排序后的科目列表
    pub fn sorted(&self) -> Vec<&Subject> {
        let mut subjects: Vec<&Subject> = self.subjects.iter().collect();
        subjects.sort_by_key(|s| s.id);
        subjects
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.id, self.name)
    }
}
