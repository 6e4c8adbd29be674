/// 成绩等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Grade {
    /// 优秀 (>= 90%)
    Excellent,
    /// 良好 (>= 75%)
    Good,
    /// 及格 (>= 60%)
    Satisfactory,
    /// 中等偏下 (>= 40%)
    Average,
    /// 入门 (< 40%)
    Beginner,
}

impl Grade {
    /// 根据百分比划分等级
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Grade::Excellent
        } else if percentage >= 75.0 {
            Grade::Good
        } else if percentage >= 60.0 {
            Grade::Satisfactory
        } else if percentage >= 40.0 {
            Grade::Average
        } else {
            Grade::Beginner
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Grade::Excellent => "优秀",
            Grade::Good => "良好",
            Grade::Satisfactory => "及格",
            Grade::Average => "中等偏下",
            Grade::Beginner => "入门",
        }
    }

    /// 给用户的评语
    pub fn message(self) -> &'static str {
        match self {
            Grade::Excellent => "🎉 非常好！你对这门课已经准备得很充分了！",
            Grade::Good => "👍 不错！再多练一点就能拿到优秀！",
            Grade::Satisfactory => "👌 及格了！继续练习，巩固知识！",
            Grade::Average => "📚 还需努力！重新复习后再来挑战！",
            Grade::Beginner => "🔰 刚刚起步！先把基础概念重新学一遍吧！",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
