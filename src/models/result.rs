use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 匹配结果行 (matches 表, 复合身份 lost_id + found_id)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MatchRecord {
    pub lost_id: i64,
    pub found_id: i64,
    pub match_score: BigDecimal,     // 固定两位小数
}

impl MatchRecord {
    /// 由整数评分构造, 统一保留两位小数 (与历史数据格式一致)
    pub fn new(lost_id: i64, found_id: i64, score: i64) -> Self {
        Self {
            lost_id,
            found_id,
            match_score: BigDecimal::from(score).with_scale(2),
        }
    }
}

/// 反向匹配联查行: 某拾得物品名下的匹配 + 挂失单 + 报失人信息
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OwnerRow {
    pub match_score: BigDecimal,
    pub lost_id: i64,
    pub user_id: i64,
    pub item_name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub location_id: i64,
    pub date_lost: DateTime<Utc>,
    pub status: String,
    pub category_name: String,
    pub location_name: String,
    pub owner_name: String,
    pub owner_email: String,
}

/// 导出联查行: 某挂失单名下的匹配 + 拾得物品信息
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoredMatchRow {
    pub lost_id: i64,
    pub found_id: i64,
    pub item_name: String,           // 拾得物品名称
    pub status: String,              // 拾得物品状态
    pub match_score: BigDecimal,
}
