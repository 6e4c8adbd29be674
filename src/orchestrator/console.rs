//! 控制台输入 - 编排层
//!
//! 把标准输入的一行解析成命令或普通文本

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// 一行用户输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `/cancel` 取消所有进行中的测试
    Cancel,
    /// `/stats` 查看历史成绩
    Stats,
    /// `/quit` 或输入结束
    Quit,
    /// 其他内容（已去掉首尾空白）
    Text(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "/cancel" => Input::Cancel,
            "/stats" => Input::Stats,
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Text(line.to_string()),
        }
    }
}

/// 行输入源
pub struct Console<R> {
    lines: Lines<R>,
}

impl Console<BufReader<Stdin>> {
    /// 从标准输入读取
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// 显示提示并读取一行，输入结束视为退出
    pub async fn next(&mut self, prompt: &str) -> Result<Input> {
        print!("{}", prompt);
        std::io::stdout().flush()?;

        match self.lines.next_line().await? {
            Some(line) => Ok(Input::parse(&line)),
            None => Ok(Input::Quit),
        }
    }
}
