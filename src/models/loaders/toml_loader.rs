use crate::models::subject::SubjectCatalog;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载科目目录
///
/// ```toml
/// [[subjects]]
/// id = 1
/// name = "Tarix"
/// file_path = "data/tarix.txt"
/// ```
pub async fn load_subject_catalog(toml_file_path: &Path) -> Result<SubjectCatalog> {
    if !toml_file_path.exists() {
        anyhow::bail!("科目目录不存在: {}", toml_file_path.display());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut catalog: SubjectCatalog = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 设置文件路径
    catalog.file_path = Some(toml_file_path.to_string_lossy().to_string());

    // 相对路径按目录文件所在位置解析
    if let Some(base) = toml_file_path.parent() {
        for subject in catalog.subjects.iter_mut() {
            let path = Path::new(&subject.file_path);
            if path.is_relative() {
                subject.file_path = base.join(path).to_string_lossy().to_string();
            }
        }
    }

    tracing::info!("成功加载 {} 个科目", catalog.subjects.len());

    Ok(catalog)
}
