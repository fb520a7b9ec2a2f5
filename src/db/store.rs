use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::queries;
use crate::models::{FoundCandidate, FoundItem, LostReport, MatchRecord, OwnerRow, StoredMatchRow};

/// 匹配服务的存储能力接口
///
/// 服务层不直接摸连接池, 全部读写经由该接口注入, 便于替换实现与测试。
/// replace_matches 必须是单事务的整体置换 (同一 lost_id 串行化)。
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// 按ID查挂失单
    async fn lost_report(&self, lost_id: i64) -> Result<Option<LostReport>, sqlx::Error>;

    /// 按ID查拾得物品
    async fn found_item(&self, found_id: i64) -> Result<Option<FoundItem>, sqlx::Error>;

    /// 刷新候选: 同类别或同地点, 不过滤状态, 封顶 100 条
    async fn found_candidates(
        &self,
        category_id: i64,
        location_id: i64,
    ) -> Result<Vec<FoundCandidate>, sqlx::Error>;

    /// 种子候选: 仍在架 (NEWLY_FOUND) 的拾得物品, 封顶 100 条
    async fn available_found_candidates(
        &self,
        category_id: i64,
        location_id: i64,
    ) -> Result<Vec<FoundItem>, sqlx::Error>;

    /// 反向种子候选: 仍挂失中 (REPORTED_LOST) 的报告, 封顶 80 条
    async fn open_lost_reports(
        &self,
        category_id: i64,
        location_id: i64,
    ) -> Result<Vec<LostReport>, sqlx::Error>;

    /// 整体置换某挂失单名下的匹配集 (单事务)
    async fn replace_matches(
        &self,
        lost_id: i64,
        records: &[MatchRecord],
    ) -> Result<(), sqlx::Error>;

    /// 批量插入匹配, 已存在的 (lost_id, found_id) 对跳过
    async fn insert_matches(&self, records: &[MatchRecord]) -> Result<u64, sqlx::Error>;

    /// 某拾得物品名下的匹配 (降序前 10) + 挂失单/报失人信息
    async fn matches_for_found(&self, found_id: i64) -> Result<Vec<OwnerRow>, sqlx::Error>;

    /// 某挂失单名下的全部落库匹配 (降序)
    async fn matches_for_lost(&self, lost_id: i64) -> Result<Vec<StoredMatchRow>, sqlx::Error>;
}

/// PostgreSQL 实现: 委托给 queries 模块
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn lost_report(&self, lost_id: i64) -> Result<Option<LostReport>, sqlx::Error> {
        queries::get_lost_report(&self.pool, lost_id).await
    }

    async fn found_item(&self, found_id: i64) -> Result<Option<FoundItem>, sqlx::Error> {
        queries::get_found_item(&self.pool, found_id).await
    }

    async fn found_candidates(
        &self,
        category_id: i64,
        location_id: i64,
    ) -> Result<Vec<FoundCandidate>, sqlx::Error> {
        queries::list_found_candidates(&self.pool, category_id, location_id).await
    }

    async fn available_found_candidates(
        &self,
        category_id: i64,
        location_id: i64,
    ) -> Result<Vec<FoundItem>, sqlx::Error> {
        queries::list_available_found_candidates(&self.pool, category_id, location_id).await
    }

    async fn open_lost_reports(
        &self,
        category_id: i64,
        location_id: i64,
    ) -> Result<Vec<LostReport>, sqlx::Error> {
        queries::list_open_lost_reports(&self.pool, category_id, location_id).await
    }

    async fn replace_matches(
        &self,
        lost_id: i64,
        records: &[MatchRecord],
    ) -> Result<(), sqlx::Error> {
        queries::replace_matches(&self.pool, lost_id, records).await
    }

    async fn insert_matches(&self, records: &[MatchRecord]) -> Result<u64, sqlx::Error> {
        queries::insert_matches(&self.pool, records).await
    }

    async fn matches_for_found(&self, found_id: i64) -> Result<Vec<OwnerRow>, sqlx::Error> {
        queries::list_matches_for_found(&self.pool, found_id).await
    }

    async fn matches_for_lost(&self, lost_id: i64) -> Result<Vec<StoredMatchRow>, sqlx::Error> {
        queries::list_matches_for_lost(&self.pool, lost_id).await
    }
}
