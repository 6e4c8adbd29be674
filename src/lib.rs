//! # Quiz Bank
//!
//! 从纯文本文档中解析单选题，并以随机测试的形式让用户作答
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 与外部协作方交互，只暴露能力
//! - `TextSource` - 按顺序读取文档的文本行
//! - `SessionStore` - 按 (用户, 科目) 读写会话
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `line_classifier` / `segmenter` - 行分类与分段
//! - `validator` - 题目校验
//! - `QuestionBankCache` - 每个科目只解析一次
//! - `ResultLog` - 追加成绩
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次测试"的完整状态机
//! - `SessionKey` - 会话键（user_id + subject_id）
//! - `QuizEngine` - 开始 → 展示 → 作答 → 前进 → 结束
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/quiz_app` - 控制台交互循环，装配所有资源
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Question, QuizResult, RawQuestion, SampleSize, Session, Subject};
pub use orchestrator::App;
pub use services::{segment, validate};
pub use workflow::{Presentation, QuizEngine, SessionKey, Step};
