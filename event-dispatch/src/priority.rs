//! 处理器优先级
//!
//! 数值越小越先执行：
//! LOWEST(-2) < LOW(-1) < NORMAL(0) < HIGH(1) < HIGHEST(2) < MONITOR(3)。
//! `Monitor` 仅是约定（只观察、不修改事件），分发器不做强制。
//!
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    Monitor,
}

impl Priority {
    /// 全部优先级，按执行先后排列
    pub const ALL: [Priority; 6] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
        Priority::Monitor,
    ];

    /// 数值表示
    pub const fn rank(self) -> i8 {
        match self {
            Priority::Lowest => -2,
            Priority::Low => -1,
            Priority::Normal => 0,
            Priority::High => 1,
            Priority::Highest => 2,
            Priority::Monitor => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Lowest => "LOWEST",
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Highest => "HIGHEST",
            Priority::Monitor => "MONITOR",
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解析失败：未知的优先级名称
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_ascending() {
        let ranks: Vec<i8> = Priority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![-2, -1, 0, 1, 2, 3]);
        assert!(Priority::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn normal_is_default() {
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("monitor".parse::<Priority>(), Ok(Priority::Monitor));
        assert_eq!(" High ".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(ParsePriorityError("urgent".to_string()))
        );
    }

    #[test]
    fn serde_uses_uppercase_names() {
        let json = serde_json::to_string(&Priority::Highest).unwrap();
        assert_eq!(json, "\"HIGHEST\"");
        let p: Priority = serde_json::from_str("\"LOWEST\"").unwrap();
        assert_eq!(p, Priority::Lowest);
        for p in Priority::ALL {
            assert_eq!(p.to_string().parse::<Priority>(), Ok(p));
        }
    }
}
