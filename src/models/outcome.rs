use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LostSummary;

/// 展示用匹配条目 (刷新接口最多返回 10 条)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayMatch {
    pub found_id: i64,
    pub item_name: String,
    pub status: String,
    pub date_found: DateTime<Utc>,
    pub image: Option<String>,
    pub category_name: String,
    pub location_name: String,
    pub score: i64,
    pub reasons: Vec<String>,
}

/// 刷新结果: 落库条数 + 展示子集
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub lost: LostSummary,
    pub stored_count: usize,
    pub matches: Vec<DisplayMatch>,
}

/// 强匹配 (score >= 40), 供通知模块提示报失人
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrongMatch {
    pub found_id: i64,
    pub item_name: String,
    pub score: i64,
    pub reasons: Vec<String>,
}

/// 挂失单创建后的种子匹配结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLostOutcome {
    pub lost_id: i64,
    pub stored_count: usize,
    pub best_strong: Option<StrongMatch>,
}

/// 反向种子匹配的通知载荷 (每个报失人只保留最优一条, 避免刷屏)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerAlert {
    pub user_id: i64,
    pub lost_id: i64,
    pub score: i64,
    pub reasons: Vec<String>,
}

/// 拾得物品登记后的反向种子匹配结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFoundOutcome {
    pub found_id: i64,
    pub inserted: u64,
    pub alerts: Vec<OwnerAlert>,
}

/// 潜在失主条目 (工作人员视角的反向匹配)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialOwner {
    pub lost_id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub date_lost: DateTime<Utc>,
    pub status: String,
    pub category_name: String,
    pub location_name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub score: i64,                  // 落库分四舍五入
    pub reasons: Vec<String>,        // 评分器现算, 仅用于解释
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_match_wire_shape() {
        let m = DisplayMatch {
            found_id: 9,
            item_name: "Blue Wallet".to_string(),
            status: "NEWLY_FOUND".to_string(),
            date_found: Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
            image: None,
            category_name: "Electronics".to_string(),
            location_name: "Library".to_string(),
            score: 75,
            reasons: vec!["Same category".to_string()],
        };

        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["found_id"], 9);
        assert_eq!(value["score"], 75);
        assert_eq!(value["image"], serde_json::Value::Null);
        assert_eq!(value["reasons"][0], "Same category");
        // 日期走 RFC 3339, 与上游约定一致
        assert_eq!(value["date_found"], "2024-03-10T00:00:00Z");
    }
}
