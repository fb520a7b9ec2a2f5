use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 拾得物品候选 (found_items 联查类别/地点名称, 用于刷新+展示)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FoundCandidate {
    pub found_id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub location_id: i64,
    pub date_found: DateTime<Utc>,
    pub image: Option<String>,       // 图片路径, 由上传模块维护
    pub status: String,              // NEWLY_FOUND / CLAIMED / RETURNED
    pub category_name: String,
    pub location_name: String,
}

/// 拾得物品窄行 (种子匹配/反向匹配只需要评分字段)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FoundItem {
    pub found_id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub location_id: i64,
    pub date_found: DateTime<Utc>,
    pub status: String,
}
