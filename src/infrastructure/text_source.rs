//! 文本来源 - 基础设施层
//!
//! 只暴露"按顺序逐行读取文档文本"的能力，不关心原始文件格式

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{AppError, AppResult, FileError};

/// 惰性文本行迭代器
pub type Lines<'a> = Box<dyn Iterator<Item = String> + Send + 'a>;

/// 文本来源
///
/// 职责：
/// - 把一个文档变成有序的文本行序列
/// - 不认识 Question / Session
pub trait TextSource: Send + Sync {
    /// 按文档顺序返回文本行
    fn lines(&self, document: &Path) -> AppResult<Lines<'_>>;
}

/// 纯文本文件来源，每行一段
///
/// Word / PDF 需要先由外部工具转换成纯文本。
#[derive(Debug, Default, Clone)]
pub struct PlainTextSource;

impl PlainTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PlainTextSource {
    fn lines(&self, document: &Path) -> AppResult<Lines<'_>> {
        if !document.exists() {
            return Err(FileError::NotFound {
                path: document.display().to_string(),
            }
            .into());
        }

        let file = File::open(document)
            .map_err(|e| AppError::file_read_failed(document.display().to_string(), e))?;

        let lines = LossyLines {
            reader: BufReader::new(file),
            path: document.display().to_string(),
            first: true,
        };

        Ok(Box::new(lines))
    }
}

/// 逐行读取原始字节，非法 UTF-8 按替换字符解码
///
/// 单行编码错误不会中断后续行，只有真正的 I/O 错误才会结束迭代。
/// 去掉行尾 `\r\n` 和文档开头的 BOM。
struct LossyLines<R> {
    reader: R,
    path: String,
    first: bool,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }

                let mut line = String::from_utf8_lossy(&buf).into_owned();
                if std::mem::take(&mut self.first) {
                    if let Some(rest) = line.strip_prefix(BOM) {
                        line = rest.to_string();
                    }
                }
                Some(line)
            }
            Err(e) => {
                // 读到一半出错时，保留已经读到的部分
                warn!("读取 {} 时中断: {}", self.path, e);
                None
            }
        }
    }
}

const BOM: char = '\u{feff}';

/// 内存文本来源，用于测试和预先解码好的文档
#[derive(Debug, Default, Clone)]
pub struct MemoryTextSource {
    documents: HashMap<PathBuf, Vec<String>>,
}

impl MemoryTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个文档
    pub fn with_document<I, S>(mut self, document: impl Into<PathBuf>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents
            .insert(document.into(), lines.into_iter().map(Into::into).collect());
        self
    }
}

impl TextSource for MemoryTextSource {
    fn lines(&self, document: &Path) -> AppResult<Lines<'_>> {
        let lines = self.documents.get(document).ok_or_else(|| FileError::NotFound {
            path: document.display().to_string(),
        })?;
        Ok(Box::new(lines.iter().cloned()))
    }
}
