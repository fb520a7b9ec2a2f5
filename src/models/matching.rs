use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FoundCandidate, FoundItem, LostReport};

/// 评分输入 (每次比较临时构造, 不落库)
///
/// category_id / location_id 由上游保证引用有效, 评分器只做相等比较。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchInput {
    pub item_name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub location_id: i64,
    pub date: DateTime<Utc>,         // 丢失日期或拾得日期
}

impl MatchInput {
    /// 从挂失单构造评分输入
    pub fn from_lost(lost: &LostReport) -> Self {
        Self {
            item_name: lost.item_name.clone(),
            description: lost.description.clone(),
            category_id: lost.category_id,
            location_id: lost.location_id,
            date: lost.date_lost,
        }
    }

    /// 从拾得物品候选构造评分输入
    pub fn from_candidate(found: &FoundCandidate) -> Self {
        Self {
            item_name: found.item_name.clone(),
            description: found.description.clone(),
            category_id: found.category_id,
            location_id: found.location_id,
            date: found.date_found,
        }
    }

    /// 从拾得物品窄行构造评分输入
    pub fn from_found(found: &FoundItem) -> Self {
        Self {
            item_name: found.item_name.clone(),
            description: found.description.clone(),
            category_id: found.category_id,
            location_id: found.location_id,
            date: found.date_found,
        }
    }
}

/// 评分结果: 0..=100 的综合分 + 可解释的命中原因
///
/// reasons 固定按 类别 -> 地点 -> 日期 -> 关键词 的顺序追加, 不重排。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: i64,
    pub reasons: Vec<String>,
}
