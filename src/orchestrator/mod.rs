//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源装配和用户交互，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `quiz_app` - 控制台答题应用
//! - 管理应用生命周期（初始化、运行）
//! - 装配会话存储、成绩日志、文本来源和题库缓存
//! - 菜单、作答、反馈、最终报告
//!
//! ### `console` - 控制台输入
//! - 逐行读取标准输入
//! - 识别 `/cancel`、`/stats`、`/quit` 命令
//!
//! ## 层次关系
//!
//! ```text
//! quiz_app (交互循环)
//!     ↓
//! workflow::QuizEngine (单个会话的状态机)
//!     ↓
//! services (能力层：分段 / 校验 / 题库缓存 / 成绩日志)
//!     ↓
//! infrastructure (基础设施：TextSource / SessionStore)
//! ```

pub mod console;
pub mod quiz_app;

// 重新导出主要类型
pub use console::{Console, Input};
pub use quiz_app::App;
