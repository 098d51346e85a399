use serde::{Deserialize, Serialize};

/// 申報週期，start 與 end 皆為含端點的年份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: i32,
    pub end: i32,
}

impl Period {
    /// 正規化：無論輸入順序為何，start 一定 <= end
    pub fn normalized(a: i32, b: i32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
