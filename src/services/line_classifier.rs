//! 行分类 - 业务能力层
//!
//! 纯函数：把一行文本归为 题目开头 / 选项 / 续行 / 空行，不保存任何状态

use regex::Regex;
use std::sync::LazyLock;

// 常量正则，模式本身不会出错
static QUESTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.)]|\s*\.)").expect("题号正则"));
static QUESTION_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.)]|\s*\.)\s*").expect("题号前缀正则"));
static LEADING_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d").expect("数字开头正则"));
static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Da-d][.)\s]").expect("选项正则"));
static OPTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Da-d](?:[.)]\s*|\s+)").expect("选项前缀正则"));

/// 导出文档开头常见的 BOM，`trim` 不会去掉它
const BOM: char = '\u{feff}';

/// 以 `«` 开头的行视为题目
const QUOTE_GLYPH: char = '«';

/// 数字开头的兜底规则只对短行生效（字符数）
const FALLBACK_MAX_CHARS: usize = 100;

/// 选项行（含字母标记）至少要有这么多字符
const MIN_OPTION_CHARS: usize = 2;

/// 行类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    QuestionStart,
    Option,
    Continuation,
    Blank,
}

/// 对一行文本分类
///
/// 题目开头优先于选项判断。数字开头且不足 100 个字符的行一律视为题目开头，
/// 因此以数字开头的选项文本可能被误判，这是启发式规则的已知局限。
pub fn classify(line: &str) -> LineKind {
    let text = normalize(line);
    if text.is_empty() {
        return LineKind::Blank;
    }
    if is_question_start(text) {
        return LineKind::QuestionStart;
    }
    if OPTION_MARKER.is_match(text) {
        return LineKind::Option;
    }
    LineKind::Continuation
}

/// 去掉首尾空白和开头的 BOM
pub fn normalize(line: &str) -> &str {
    line.trim().trim_start_matches(BOM).trim_start()
}

fn is_question_start(text: &str) -> bool {
    if QUESTION_NUMBER.is_match(text) || text.starts_with(QUOTE_GLYPH) {
        return true;
    }

    // 兜底：数字开头的短行
    LEADING_DIGIT.is_match(text) && text.chars().count() < FALLBACK_MAX_CHARS
}

/// 去掉选项前的字母标记
///
/// 返回空串表示丢弃该选项：选项行不足 2 个字符，或去掉标记后什么都不剩。
pub fn clean_option(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() < MIN_OPTION_CHARS {
        return String::new();
    }

    OPTION_PREFIX.replace(text, "").trim().to_string()
}

/// 去掉题目开头的题号（`1.`、`2)`、`3 .`）
///
/// 没有题号的行原样返回（已去除首尾空白）。
pub fn strip_question_number(text: &str) -> String {
    let text = text.trim();
    QUESTION_NUMBER_PREFIX.replace(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("   \t "), LineKind::Blank);
    }

    #[test]
    fn test_question_start_patterns() {
        assert_eq!(classify("1. What is 2+2?"), LineKind::QuestionStart);
        assert_eq!(classify("12) Capital of France"), LineKind::QuestionStart);
        assert_eq!(classify("  3 . spaced"), LineKind::QuestionStart);
        assert_eq!(classify("«Qaysi yil?»"), LineKind::QuestionStart);
        // 兜底：数字开头的短行
        assert_eq!(classify("1945 yilda nima bo'ldi"), LineKind::QuestionStart);
    }

    #[test]
    fn test_long_digit_line_without_marker_is_continuation() {
        let long = format!("2023 {}", "x".repeat(120));
        assert_eq!(classify(&long), LineKind::Continuation);

        let numbered = format!("5. {}", "x".repeat(120));
        assert_eq!(classify(&numbered), LineKind::QuestionStart);
    }

    #[test]
    fn test_question_start_wins_over_option() {
        assert_eq!(classify("1) A. text"), LineKind::QuestionStart);
        assert_eq!(classify("2. B) ikki"), LineKind::QuestionStart);
        assert_eq!(classify("«A) iqtibos»"), LineKind::QuestionStart);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        assert_eq!(classify("\u{feff}1. First?"), LineKind::QuestionStart);
        assert_eq!(classify("\u{feff}"), LineKind::Blank);
        assert_eq!(normalize(" \u{feff} A) yes "), "A) yes");
    }

    #[test]
    fn test_option_patterns() {
        assert_eq!(classify("A) 3"), LineKind::Option);
        assert_eq!(classify("b. Lyon"), LineKind::Option);
        assert_eq!(classify("C Paris"), LineKind::Option);
        assert_eq!(classify("d)x"), LineKind::Option);
    }

    #[test]
    fn test_non_option_letters_are_continuation() {
        assert_eq!(classify("E) five"), LineKind::Continuation);
        assert_eq!(classify("Also a sentence"), LineKind::Continuation);
        assert_eq!(classify("Bir gap"), LineKind::Continuation);
    }

    #[test]
    fn test_numeric_option_text_is_question_start() {
        // 已知局限：数字开头的选项被当作题目
        assert_eq!(classify("4 apples"), LineKind::QuestionStart);
    }

    #[test]
    fn test_clean_option() {
        assert_eq!(clean_option("A) 3 apples"), "3 apples");
        assert_eq!(clean_option("b.Lyon"), "Lyon");
        assert_eq!(clean_option("C   Paris "), "Paris");
        assert_eq!(clean_option("A) 3"), "3");
        // 只去掉一个标记
        assert_eq!(clean_option("A) B Smith"), "B Smith");
        // 只有标记的选项被丢弃
        assert_eq!(clean_option("A)"), "");
        assert_eq!(clean_option("B.   "), "");
        assert_eq!(clean_option("c"), "");
    }

    #[test]
    fn test_strip_question_number() {
        assert_eq!(strip_question_number("1. What is 2+2?"), "What is 2+2?");
        assert_eq!(strip_question_number("12)Capital"), "Capital");
        assert_eq!(strip_question_number("«Quote»"), "«Quote»");
        assert_eq!(strip_question_number("1945 yilda"), "1945 yilda");
        assert_eq!(strip_question_number("7."), "");
    }
}
