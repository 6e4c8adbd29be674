/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 科目目录 (TOML)
    pub catalog_path: String,
    /// 会话 JSON 文件存放目录
    pub session_dir: String,
    /// 成绩日志文件 (JSON Lines)
    pub results_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 展示配置 ---
    pub question_display_limit: usize,
    pub option_display_limit: usize,
    // --- 控制台用户 ---
    pub user_id: i64,
    pub user_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: "subjects.toml".to_string(),
            session_dir: "sessions".to_string(),
            results_file: "results.jsonl".to_string(),
            verbose_logging: false,
            output_log_file: "quiz_log.txt".to_string(),
            question_display_limit: 1000,
            option_display_limit: 50,
            user_id: 1,
            user_name: "student".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            catalog_path: std::env::var("QUIZ_CATALOG_PATH").unwrap_or(default.catalog_path),
            session_dir: std::env::var("QUIZ_SESSION_DIR").unwrap_or(default.session_dir),
            results_file: std::env::var("QUIZ_RESULTS_FILE").unwrap_or(default.results_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            question_display_limit: std::env::var("QUESTION_DISPLAY_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.question_display_limit),
            option_display_limit: std::env::var("OPTION_DISPLAY_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.option_display_limit),
            user_id: std::env::var("QUIZ_USER_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(default.user_id),
            user_name: std::env::var("QUIZ_USER_NAME").unwrap_or(default.user_name),
        }
    }
}
