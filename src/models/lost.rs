use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 挂失单主表 (lost_items)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LostReport {
    pub lost_id: i64,
    pub user_id: i64,                // 报失人ID
    pub item_name: String,
    pub description: Option<String>,
    pub category_id: i64,            // 物品类别ID
    pub location_id: i64,            // 丢失地点ID
    pub date_lost: DateTime<Utc>,
    pub status: String,              // REPORTED_LOST / FOUND / CANCELLED
}

/// 挂失单摘要 (刷新结果只回传标识字段)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LostSummary {
    pub lost_id: i64,
    pub item_name: String,
}

impl From<&LostReport> for LostSummary {
    fn from(lost: &LostReport) -> Self {
        Self {
            lost_id: lost.lost_id,
            item_name: lost.item_name.clone(),
        }
    }
}
