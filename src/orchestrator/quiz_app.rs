//! 控制台答题应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源装配和交互循环。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、科目目录、会话存储、成绩日志
//! 2. **科目选择**：列出目录中的科目
//! 3. **题量选择**：10 / 20 / 30 / 40 / 60 / all
//! 4. **逐题作答**：字母作答，立即反馈，回车进入下一题
//! 5. **命令**：`/cancel`、`/stats`、`/quit` 在任何提示下都可以输入
//!
//! 每一行输入处理完再读下一行，不存在会话内并发。

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{FileSessionStore, PlainTextSource};
use crate::models::{load_subject_catalog, QuizReport, SampleSize, Subject, SubjectCatalog};
use crate::orchestrator::console::{Console, Input};
use crate::services::{JsonlResultLog, QuestionBankCache};
use crate::utils::logging::{init_log_file, log_startup};
use crate::utils::truncate_text;
use crate::workflow::{AnswerOutcome, Presentation, QuizEngine, Step};

/// 交互流程中每一步的走向
enum Flow<T> {
    Next(T),
    /// 回到科目菜单
    Restart,
    Quit,
}

/// 应用主结构
pub struct App {
    config: Config,
    catalog: SubjectCatalog,
    engine: QuizEngine<FileSessionStore, JsonlResultLog>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        let catalog = load_subject_catalog(Path::new(&config.catalog_path)).await?;
        log_startup(catalog.subjects.len());

        let store = FileSessionStore::new(&config.session_dir)?;
        let results = JsonlResultLog::with_path(&config.results_file);
        let engine = QuizEngine::new(
            store,
            results,
            PlainTextSource::new(),
            Arc::new(QuestionBankCache::new()),
        );

        Ok(Self {
            config,
            catalog,
            engine,
        })
    }

    /// 运行应用主逻辑（读取标准输入）
    pub async fn run(&self) -> Result<()> {
        let mut console = Console::stdin();
        self.run_with(&mut console).await
    }

    /// 使用指定的输入源运行
    pub async fn run_with<R: AsyncBufRead + Unpin>(&self, console: &mut Console<R>) -> Result<()> {
        if self.catalog.is_empty() {
            warn!("⚠️ 科目目录为空，程序结束");
            return Ok(());
        }

        print_help();

        loop {
            let subject = match self.select_subject(console).await? {
                Flow::Next(subject) => subject,
                Flow::Restart => continue,
                Flow::Quit => break,
            };

            let sample = match self.select_sample_size(console, subject).await? {
                Flow::Next(sample) => sample,
                Flow::Restart => continue,
                Flow::Quit => break,
            };

            if let Err(e) = self.engine.start_session(
                self.config.user_id,
                &self.config.user_name,
                subject,
                sample,
            ) {
                report_error(&e);
                continue;
            }

            match self.run_quiz(console, subject).await {
                Ok(Flow::Quit) => break,
                Ok(_) => {}
                Err(e) => match e.downcast_ref::<AppError>() {
                    Some(app_error) => report_error(app_error),
                    None => return Err(e),
                },
            }
        }

        info!("👋 程序结束，日志已保存至: {}", self.config.output_log_file);
        Ok(())
    }

    /// 选择科目
    async fn select_subject<R: AsyncBufRead + Unpin>(
        &self,
        console: &mut Console<R>,
    ) -> Result<Flow<&Subject>> {
        println!("\n📚 请选择科目:");
        for subject in self.catalog.sorted() {
            println!("  {}", subject);
        }

        loop {
            match console.next("科目编号: ").await? {
                Input::Quit => return Ok(Flow::Quit),
                Input::Cancel => {
                    self.cancel_all()?;
                    return Ok(Flow::Restart);
                }
                Input::Stats => self.print_stats()?,
                Input::Text(text) => {
                    let Ok(id) = text.parse::<i64>() else {
                        println!("请输入科目编号");
                        continue;
                    };
                    match self.catalog.get(id) {
                        Ok(subject) => return Ok(Flow::Next(subject)),
                        Err(e) => println!("❌ {}", e),
                    }
                }
            }
        }
    }

    /// 选择题目数量
    async fn select_sample_size<R: AsyncBufRead + Unpin>(
        &self,
        console: &mut Console<R>,
        subject: &Subject,
    ) -> Result<Flow<SampleSize>> {
        let choices: Vec<String> = SampleSize::CHOICES.iter().map(|c| c.to_string()).collect();
        println!("\n📝 {}: 需要多少道题? ({})", subject.name, choices.join(" / "));

        loop {
            match console.next("题目数量: ").await? {
                Input::Quit => return Ok(Flow::Quit),
                Input::Cancel => {
                    self.cancel_all()?;
                    return Ok(Flow::Restart);
                }
                Input::Stats => self.print_stats()?,
                Input::Text(text) => match text.parse::<SampleSize>() {
                    Ok(sample) => return Ok(Flow::Next(sample)),
                    Err(e) => println!("❌ {}", e),
                },
            }
        }
    }

    /// 逐题作答直到测试结束
    async fn run_quiz<R: AsyncBufRead + Unpin>(
        &self,
        console: &mut Console<R>,
        subject: &Subject,
    ) -> Result<Flow<()>> {
        let user_id = self.config.user_id;

        loop {
            let presentation = match self.engine.present_current(user_id, subject.id)? {
                Step::Completed(report) => {
                    print_report(subject, &report);
                    return Ok(Flow::Next(()));
                }
                Step::Question(presentation) => presentation,
            };

            self.print_question(&presentation);

            let slot = loop {
                match console.next("你的答案: ").await? {
                    Input::Quit => return Ok(Flow::Quit),
                    Input::Cancel => {
                        self.cancel_all()?;
                        return Ok(Flow::Restart);
                    }
                    Input::Stats => self.print_stats()?,
                    Input::Text(text) => match parse_letter(&presentation, &text) {
                        Some(slot) => break slot,
                        None => println!(
                            "请输入 A-{}",
                            Presentation::letter(presentation.options.len() - 1)
                        ),
                    },
                }
            };

            let outcome = self.engine.submit_answer(
                user_id,
                subject.id,
                slot,
                presentation.correct_slot,
            )?;
            self.print_outcome(&presentation, &outcome);

            match console.next("按回车继续...").await? {
                Input::Quit => return Ok(Flow::Quit),
                Input::Cancel => {
                    self.cancel_all()?;
                    return Ok(Flow::Restart);
                }
                Input::Stats => self.print_stats()?,
                Input::Text(_) => {}
            }

            self.engine.advance(user_id, subject.id)?;
        }
    }

    fn cancel_all(&self) -> Result<()> {
        let removed = self.engine.cancel_all(self.config.user_id)?;
        println!("🛑 已取消 {} 个进行中的测试", removed);
        Ok(())
    }

    fn print_stats(&self) -> Result<()> {
        let stats = self.engine.user_stats(self.config.user_id)?;
        if stats.tests_taken == 0 {
            println!("📊 还没有完成过测试");
        } else {
            println!(
                "📊 已完成 {} 次测试 | 最好成绩 {:.1}% | 平均 {:.1}%",
                stats.tests_taken, stats.best_percentage, stats.average_percentage
            );
        }
        Ok(())
    }

    // ========== 显示辅助方法 ==========

    fn print_question(&self, p: &Presentation) {
        println!("\n{}", "─".repeat(60));
        println!(
            "第 {}/{} 题: {}",
            p.position,
            p.total,
            truncate_text(&p.question_text, self.config.question_display_limit)
        );
        for (slot, option) in p.options.iter().enumerate() {
            println!(
                "  {}) {}",
                Presentation::letter(slot),
                truncate_text(option, self.config.option_display_limit)
            );
        }
    }

    fn print_outcome(&self, p: &Presentation, outcome: &AnswerOutcome) {
        if outcome.is_correct {
            println!("✅ 正确!");
        } else {
            println!(
                "❌ 错误，正确答案: {}) {}",
                Presentation::letter(outcome.correct_slot),
                truncate_text(&p.options[outcome.correct_slot], self.config.option_display_limit)
            );
        }
        println!("当前得分: {}/{}", outcome.score, outcome.total);
    }
}

/// 解析字母答案，只接受单个字母
fn parse_letter(p: &Presentation, text: &str) -> Option<usize> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => p.slot_of(letter),
        _ => None,
    }
}

// ========== 日志辅助函数 ==========

fn print_help() {
    println!("{}", "=".repeat(60));
    println!("命令: /cancel 取消测试 | /stats 查看成绩 | /quit 退出");
    println!("{}", "=".repeat(60));
}

fn print_report(subject: &Subject, report: &QuizReport) {
    println!("\n{}", "=".repeat(60));
    println!("🏁 测试结束: {}", subject.name);
    println!(
        "完成时间: {}",
        report.result.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", "=".repeat(60));
    println!("✅ 正确: {}/{}", report.result.score, report.result.total);
    println!("❌ 错误: {}", report.wrong);
    println!("📊 正确率: {:.1}%", report.result.percentage);
    println!("🎓 等级: {} - {}", report.grade, report.grade.message());
    println!("{}", "=".repeat(60));
}

fn report_error(e: &AppError) {
    if e.is_session_not_found() {
        warn!("⚠️ {}，请重新开始测试", e);
    } else if e.is_store_unavailable() {
        error!("❌ 存储不可用，本次操作未生效: {}", e);
    } else {
        error!("❌ {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letter_accepts_single_letter_in_range() {
        let p = Presentation {
            position: 1,
            total: 1,
            question_text: "q".to_string(),
            options: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            slot_to_original: vec![2, 0, 1],
            correct_slot: 1,
        };
        assert_eq!(parse_letter(&p, "a"), Some(0));
        assert_eq!(parse_letter(&p, "C"), Some(2));
        assert_eq!(parse_letter(&p, "D"), None);
        assert_eq!(parse_letter(&p, "AB"), None);
        assert_eq!(parse_letter(&p, ""), None);
    }
}
