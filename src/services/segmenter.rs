//! 题目分段 - 业务能力层
//!
//! 单次顺序扫描文本行，拼出原始题目（题干 + 选项），不回溯
//!
//! 规则：
//! 1. 题目开头：关闭上一题（选项 >= 2 才产出，否则丢弃），开始新题
//! 2. 选项：去掉字母标记后追加到当前题
//! 3. 续行：还没有选项时拼到题干，否则拼到最后一个选项
//! 4. 空行：跳过，不影响任何状态

use tracing::debug;

use crate::models::RawQuestion;
use crate::services::line_classifier::{
    classify, clean_option, normalize, strip_question_number, LineKind,
};

/// 一道题至少需要的选项数
pub const MIN_OPTIONS: usize = 2;

/// 正确答案判定策略
///
/// 题库文档没有标注答案，约定第一个选项为正确答案。
pub trait AnswerKeyPolicy {
    fn correct_index(&self, question: &str, options: &[String]) -> usize;
}

/// 约定：第一个识别到的选项是正确答案
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstOptionIsCorrect;

impl FirstOptionIsCorrect {
    pub const INDEX: usize = 0;
}

impl AnswerKeyPolicy for FirstOptionIsCorrect {
    fn correct_index(&self, _question: &str, _options: &[String]) -> usize {
        Self::INDEX
    }
}

/// 关闭一道题时的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// 结构完整，产出
    Emitted(RawQuestion),
    /// 选项不足，丢弃
    Discarded { text: String, option_count: usize },
}

/// 分段器
///
/// 逐行 `push`，最后 `finish`；每次关闭题目都会返回一个 `SegmentOutcome`。
#[derive(Debug, Default)]
pub struct Segmenter<P = FirstOptionIsCorrect> {
    policy: P,
    current: Option<String>,
    options: Vec<String>,
}

impl Segmenter {
    /// 使用"第一个选项正确"的约定
    pub fn new() -> Self {
        Self::with_policy(FirstOptionIsCorrect)
    }
}

impl<P: AnswerKeyPolicy> Segmenter<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            current: None,
            options: Vec::new(),
        }
    }

    /// 处理一行，如果这一行关闭了上一题则返回结果
    pub fn push(&mut self, line: &str) -> Option<SegmentOutcome> {
        let text = normalize(line);

        match classify(text) {
            LineKind::Blank => None,
            LineKind::QuestionStart => {
                let closed = self.close();
                self.current = Some(strip_question_number(text));
                closed
            }
            LineKind::Option => {
                if self.current.is_some() {
                    let option = clean_option(text);
                    if !option.is_empty() {
                        self.options.push(option);
                    }
                }
                None
            }
            LineKind::Continuation => {
                if let Some(question) = self.current.as_mut() {
                    match self.options.last_mut() {
                        Some(last) => append_joined(last, text),
                        None => append_joined(question, text),
                    }
                }
                None
            }
        }
    }

    /// 输入结束，关闭最后一道题
    pub fn finish(mut self) -> Option<SegmentOutcome> {
        self.close()
    }

    fn close(&mut self) -> Option<SegmentOutcome> {
        let text = self.current.take()?;
        let options = std::mem::take(&mut self.options);

        if options.len() < MIN_OPTIONS {
            return Some(SegmentOutcome::Discarded {
                text,
                option_count: options.len(),
            });
        }

        let correct_index = self.policy.correct_index(&text, &options);
        Some(SegmentOutcome::Emitted(RawQuestion {
            text,
            options,
            correct_index,
        }))
    }
}

fn append_joined(target: &mut String, piece: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(piece);
}

/// 分段结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentReport {
    pub questions: Vec<RawQuestion>,
    pub discarded: usize,
}

/// 把文本行切分成原始题目（文档顺序）
pub fn segment<I, S>(lines: I) -> Vec<RawQuestion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segment_with_report(lines).questions
}

/// 同 `segment`，额外统计被丢弃的题目数
pub fn segment_with_report<I, S>(lines: I) -> SegmentReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = Segmenter::new();
    let mut report = SegmentReport::default();

    for line in lines {
        if let Some(outcome) = segmenter.push(line.as_ref()) {
            record(&mut report, outcome);
        }
    }
    if let Some(outcome) = segmenter.finish() {
        record(&mut report, outcome);
    }

    report
}

fn record(report: &mut SegmentReport, outcome: SegmentOutcome) {
    match outcome {
        SegmentOutcome::Emitted(question) => report.questions.push(question),
        SegmentOutcome::Discarded { text, option_count } => {
            debug!("丢弃选项不足的题目 ({} 个选项): {}", option_count, text);
            report.discarded += 1;
        }
    }
}

/// 文档结构统计，用于排查解析不出题目的文档
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub total_lines: usize,
    pub non_empty_lines: usize,
    pub question_like: usize,
    pub option_like: usize,
    pub sample_lines: Vec<String>,
}

/// 最多保留的样例行数
const SAMPLE_LINES: usize = 10;

/// 统计文档中各类行的数量
pub fn analyze<I, S>(lines: I) -> DocumentStats
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stats = DocumentStats::default();

    for (i, line) in lines.into_iter().enumerate() {
        let text = normalize(line.as_ref());
        stats.total_lines += 1;

        match classify(text) {
            LineKind::Blank => continue,
            LineKind::QuestionStart => stats.question_like += 1,
            LineKind::Option => stats.option_like += 1,
            LineKind::Continuation => {}
        }

        stats.non_empty_lines += 1;
        if stats.sample_lines.len() < SAMPLE_LINES {
            stats.sample_lines.push(format!("{}: {}", i, text));
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, options: &[&str]) -> RawQuestion {
        RawQuestion {
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_index: 0,
        }
    }

    #[test]
    fn test_single_question() {
        let questions = segment(["1. What is 2+2?", "A) 3", "B) 4", "C) 5"]);
        assert_eq!(questions, vec![raw("What is 2+2?", &["3", "4", "5"])]);
    }

    #[test]
    fn test_question_with_too_few_options_is_discarded() {
        let report = segment_with_report([
            "1) Capital of France",
            "A. Paris",
            "B. Lyon",
            "2) Next question",
            "A. X",
        ]);
        assert_eq!(report.questions, vec![raw("Capital of France", &["Paris", "Lyon"])]);
        assert_eq!(report.discarded, 1);
    }

    #[test]
    fn test_discarded_run_does_not_affect_following_questions() {
        let questions = segment([
            "1. Broken",
            "A) only one",
            "2. Good",
            "A) yes",
            "B) no",
        ]);
        assert_eq!(questions, vec![raw("Good", &["yes", "no"])]);
    }

    #[test]
    fn test_multi_line_question_and_options() {
        let questions = segment([
            "1. Which river",
            "flows through Tashkent?",
            "",
            "A) Chirchiq",
            "river",
            "B) Amudaryo",
            "   ",
            "C) Sirdaryo",
        ]);
        assert_eq!(
            questions,
            vec![raw(
                "Which river flows through Tashkent?",
                &["Chirchiq river", "Amudaryo", "Sirdaryo"]
            )]
        );
    }

    #[test]
    fn test_lines_before_first_question_are_ignored() {
        let questions = segment([
            "Tarix fanidan test",
            "A) stray option",
            "«Amir Temur qachon tug'ilgan?»",
            "a) 1336",
            "b) 1370",
        ]);
        assert_eq!(
            questions,
            vec![raw("«Amir Temur qachon tug'ilgan?»", &["1336", "1370"])]
        );
    }

    #[test]
    fn test_leading_byte_order_mark_keeps_first_question() {
        let questions = segment([
            "\u{feff}1. First?",
            "A) yes",
            "B) no",
            "2. Second?",
            "A) a1",
            "B) b1",
        ]);
        assert_eq!(
            questions,
            vec![
                raw("First?", &["yes", "no"]),
                raw("Second?", &["a1", "b1"]),
            ]
        );
    }

    #[test]
    fn test_number_only_line_takes_text_from_continuation() {
        let questions = segment(["7.", "Qaysi javob to'g'ri?", "A) bu", "B) u"]);
        assert_eq!(questions, vec![raw("Qaysi javob to'g'ri?", &["bu", "u"])]);
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let lines = vec![
            "1. q1", "A) a", "B) b", "2. q2", "A) c", "3. q3", "A) d", "B) e", "C) f",
        ];
        let first = segment(lines.iter());
        for _ in 0..5 {
            assert_eq!(segment(lines.iter()), first);
        }
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_push_reports_outcomes() {
        let mut segmenter = Segmenter::new();
        assert_eq!(segmenter.push("1. q"), None);
        assert_eq!(segmenter.push("A) x1"), None);
        assert_eq!(
            segmenter.push("2. r"),
            Some(SegmentOutcome::Discarded {
                text: "q".to_string(),
                option_count: 1
            })
        );
        assert_eq!(segmenter.finish(), Some(SegmentOutcome::Discarded {
            text: "r".to_string(),
            option_count: 0
        }));
    }

    #[test]
    fn test_custom_answer_key_policy() {
        struct LastOption;
        impl AnswerKeyPolicy for LastOption {
            fn correct_index(&self, _question: &str, options: &[String]) -> usize {
                options.len() - 1
            }
        }

        let mut segmenter = Segmenter::with_policy(LastOption);
        for line in ["1. q", "A) x1", "B) x2", "C) x3"] {
            assert!(segmenter.push(line).is_none());
        }
        match segmenter.finish() {
            Some(SegmentOutcome::Emitted(q)) => assert_eq!(q.correct_index, 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_analyze_counts_line_kinds() {
        let stats = analyze(["1. q", "A) a1", "", "B) b1", "continued"]);
        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.non_empty_lines, 4);
        assert_eq!(stats.question_like, 1);
        assert_eq!(stats.option_like, 2);
        assert_eq!(stats.sample_lines[0], "0: 1. q");
    }
}
