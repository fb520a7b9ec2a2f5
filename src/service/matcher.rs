use bigdecimal::ToPrimitive;
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::db::{queries, MatchStore};
use crate::error::MatchError;
use crate::models::{
    DisplayMatch, LostReport, LostSummary, MatchInput, MatchRecord, OwnerAlert, PotentialOwner,
    RefreshOutcome, SeedFoundOutcome, SeedLostOutcome, StrongMatch,
};
use crate::service::scorer::score_lost_vs_found;

// 阈值/截断为标定常量, 与历史数据口径一致, 不要重新推导
const STORE_MIN_SCORE: i64 = 20;    // 落库下限
const STORE_LIMIT: usize = 30;      // 落库条数上限
const DISPLAY_MIN_SCORE: i64 = 25;  // 展示下限
const DISPLAY_LIMIT: usize = 10;    // 展示条数上限
const STRONG_MIN_SCORE: i64 = 40;   // 强匹配 (触发通知) 下限
const ALERT_LIMIT: usize = 10;      // 反向种子匹配参与通知的条数上限

/// 调用方角色 (上游网关认证后传入)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Staff,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "USER" => Some(Role::User),
            "STAFF" => Some(Role::Staff),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// 调用方身份: 服务层只做归属/权限判定, 不做认证
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

impl Caller {
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, Role::Staff | Role::Admin)
    }
}

/// 挂失-拾得匹配服务
///
/// 存储能力经构造参数注入; 评分本身是纯函数, 候选之间无共享状态,
/// 整批评分走数据并行。
pub struct MatchService<S> {
    store: S,
}

impl<S: MatchStore> MatchService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 本人或工作人员/管理员可操作该挂失单
    fn authorize_owner(caller: &Caller, lost: &LostReport) -> Result<(), MatchError> {
        if caller.is_privileged() || caller.user_id == lost.user_id {
            Ok(())
        } else {
            Err(MatchError::Forbidden)
        }
    }

    /// 仅工作人员/管理员
    fn authorize_privileged(caller: &Caller) -> Result<(), MatchError> {
        if caller.is_privileged() {
            Ok(())
        } else {
            Err(MatchError::Forbidden)
        }
    }

    /// 刷新某挂失单的候选匹配集
    ///
    /// 失败 (候选查询或置换事务) 即整体中止, 无半写; 底层数据不变时
    /// 重复调用结果相同, 调用方可安全重试。
    pub async fn refresh_matches(
        &self,
        caller: &Caller,
        lost_id: i64,
    ) -> Result<RefreshOutcome, MatchError> {
        // 1. 查挂失单
        let lost = self
            .store
            .lost_report(lost_id)
            .await?
            .ok_or_else(|| MatchError::lost_not_found(lost_id))?;

        // 2. 归属校验
        Self::authorize_owner(caller, &lost)?;

        // 3. 拉取候选: 同类别或同地点 (不过滤状态, 可否认领由展示层决定)
        let candidates = self
            .store
            .found_candidates(lost.category_id, lost.location_id)
            .await?;
        let candidate_count = candidates.len();

        // 4. 逐一评分
        let lost_input = MatchInput::from_lost(&lost);
        let scored_all: Vec<DisplayMatch> = candidates
            .into_par_iter()
            .map(|f| {
                let result = score_lost_vs_found(&lost_input, &MatchInput::from_candidate(&f));
                DisplayMatch {
                    found_id: f.found_id,
                    item_name: f.item_name,
                    status: f.status,
                    date_found: f.date_found,
                    image: f.image,
                    category_name: f.category_name,
                    location_name: f.location_name,
                    score: result.score,
                    reasons: result.reasons,
                }
            })
            .collect();

        // 5. 落库集: score >= 20, 降序取前 30
        let mut to_store: Vec<&DisplayMatch> = scored_all
            .iter()
            .filter(|m| m.score >= STORE_MIN_SCORE)
            .collect();
        to_store.sort_by(|a, b| b.score.cmp(&a.score));
        to_store.truncate(STORE_LIMIT);

        let records: Vec<MatchRecord> = to_store
            .iter()
            .map(|m| MatchRecord::new(lost_id, m.found_id, m.score))
            .collect();

        // 6. 展示集: score >= 25, 降序取前 10
        //    始终从全量评分取, 不从已截断的落库集取, 避免叠加截断偏差
        let mut to_show: Vec<DisplayMatch> = scored_all
            .iter()
            .filter(|m| m.score >= DISPLAY_MIN_SCORE)
            .cloned()
            .collect();
        to_show.sort_by(|a, b| b.score.cmp(&a.score));
        to_show.truncate(DISPLAY_LIMIT);

        // 7. 单事务整体置换旧匹配集
        self.store.replace_matches(lost_id, &records).await?;

        tracing::info!(
            "挂失单 {} 刷新匹配: 候选 {} 条, 落库 {} 条, 展示 {} 条",
            lost_id, candidate_count, records.len(), to_show.len()
        );

        Ok(RefreshOutcome {
            lost: LostSummary::from(&lost),
            stored_count: records.len(),
            matches: to_show,
        })
    }

    /// 挂失单创建后的种子匹配: 只补不删
    ///
    /// 候选限定仍在架 (NEWLY_FOUND) 的拾得物品; 已存在的配对保留原分值。
    /// 返回最强匹配 (score >= 40) 供通知模块提示报失人。
    pub async fn seed_for_lost(
        &self,
        caller: &Caller,
        lost_id: i64,
    ) -> Result<SeedLostOutcome, MatchError> {
        let lost = self
            .store
            .lost_report(lost_id)
            .await?
            .ok_or_else(|| MatchError::lost_not_found(lost_id))?;
        Self::authorize_owner(caller, &lost)?;

        let candidates = self
            .store
            .available_found_candidates(lost.category_id, lost.location_id)
            .await?;

        let lost_input = MatchInput::from_lost(&lost);
        let scored: Vec<(i64, String, i64, Vec<String>)> = candidates
            .into_par_iter()
            .map(|f| {
                let result = score_lost_vs_found(&lost_input, &MatchInput::from_found(&f));
                (f.found_id, f.item_name, result.score, result.reasons)
            })
            .collect();

        // 落库: >= 20 降序前 30
        let mut to_store: Vec<&(i64, String, i64, Vec<String>)> = scored
            .iter()
            .filter(|(_, _, score, _)| *score >= STORE_MIN_SCORE)
            .collect();
        to_store.sort_by(|a, b| b.2.cmp(&a.2));
        to_store.truncate(STORE_LIMIT);

        let records: Vec<MatchRecord> = to_store
            .iter()
            .map(|(found_id, _, score, _)| MatchRecord::new(lost_id, *found_id, *score))
            .collect();
        let inserted = self.store.insert_matches(&records).await?;

        // 最强匹配: >= 40 降序取第一条 (同分保持候选顺序)
        let mut strong: Vec<&(i64, String, i64, Vec<String>)> = scored
            .iter()
            .filter(|(_, _, score, _)| *score >= STRONG_MIN_SCORE)
            .collect();
        strong.sort_by(|a, b| b.2.cmp(&a.2));
        let best_strong = strong.first().map(|(found_id, item_name, score, reasons)| StrongMatch {
            found_id: *found_id,
            item_name: item_name.clone(),
            score: *score,
            reasons: reasons.clone(),
        });

        tracing::info!(
            "挂失单 {} 种子匹配: 入库 {} 条 (新增 {}), 强匹配 {}",
            lost_id, records.len(), inserted, best_strong.is_some()
        );

        Ok(SeedLostOutcome {
            lost_id,
            stored_count: records.len(),
            best_strong,
        })
    }

    /// 拾得物品登记后的反向种子匹配 (工作人员动作)
    ///
    /// 对每个仍挂失中的报告评分入库; 强匹配按报失人去重,
    /// 每人只保留最优一条通知载荷。
    pub async fn seed_for_found(
        &self,
        caller: &Caller,
        found_id: i64,
    ) -> Result<SeedFoundOutcome, MatchError> {
        Self::authorize_privileged(caller)?;

        let found = self
            .store
            .found_item(found_id)
            .await?
            .ok_or_else(|| MatchError::found_not_found(found_id))?;

        let lost_reports = self
            .store
            .open_lost_reports(found.category_id, found.location_id)
            .await?;

        let found_input = MatchInput::from_found(&found);
        let scored: Vec<(i64, i64, i64, Vec<String>)> = lost_reports
            .par_iter()
            .map(|l| {
                let result = score_lost_vs_found(&MatchInput::from_lost(l), &found_input);
                (l.lost_id, l.user_id, result.score, result.reasons)
            })
            .collect();

        // A. 落库: >= 20 降序前 30, 已存在的配对跳过
        let mut to_store: Vec<&(i64, i64, i64, Vec<String>)> = scored
            .iter()
            .filter(|(_, _, score, _)| *score >= STORE_MIN_SCORE)
            .collect();
        to_store.sort_by(|a, b| b.2.cmp(&a.2));
        to_store.truncate(STORE_LIMIT);

        let records: Vec<MatchRecord> = to_store
            .iter()
            .map(|(lost_id, _, score, _)| MatchRecord::new(*lost_id, found_id, *score))
            .collect();
        let inserted = self.store.insert_matches(&records).await?;

        // B. 通知载荷: 强匹配降序前 10, 每个报失人只留最优一条
        let mut strong: Vec<&(i64, i64, i64, Vec<String>)> = scored
            .iter()
            .filter(|(_, _, score, _)| *score >= STRONG_MIN_SCORE)
            .collect();
        strong.sort_by(|a, b| b.2.cmp(&a.2));
        strong.truncate(ALERT_LIMIT);

        let mut best_per_user: IndexMap<i64, OwnerAlert> = IndexMap::new();
        for (lost_id, user_id, score, reasons) in strong.into_iter() {
            let replace = best_per_user
                .get(user_id)
                .map(|existing| *score > existing.score)
                .unwrap_or(true);
            if replace {
                best_per_user.insert(
                    *user_id,
                    OwnerAlert {
                        user_id: *user_id,
                        lost_id: *lost_id,
                        score: *score,
                        reasons: reasons.clone(),
                    },
                );
            }
        }
        let alerts: Vec<OwnerAlert> = best_per_user.into_values().collect();

        tracing::info!(
            "拾得物品 {} 反向种子匹配: 候选 {} 条, 新增入库 {} 条, 通知 {} 人",
            found_id, scored.len(), inserted, alerts.len()
        );

        Ok(SeedFoundOutcome {
            found_id,
            inserted,
            alerts,
        })
    }

    /// 某拾得物品的潜在失主 (工作人员视角的反向匹配, 前 10 条)
    ///
    /// 匹配表只落分值, 原因用评分器现算, 仅作解释用途。
    pub async fn potential_owners(
        &self,
        caller: &Caller,
        found_id: i64,
    ) -> Result<Vec<PotentialOwner>, MatchError> {
        Self::authorize_privileged(caller)?;

        let found = self
            .store
            .found_item(found_id)
            .await?
            .ok_or_else(|| MatchError::found_not_found(found_id))?;

        let rows = self.store.matches_for_found(found_id).await?;
        let found_input = MatchInput::from_found(&found);

        let owners = rows
            .into_iter()
            .map(|row| {
                let lost_input = MatchInput {
                    item_name: row.item_name.clone(),
                    description: row.description.clone(),
                    category_id: row.category_id,
                    location_id: row.location_id,
                    date: row.date_lost,
                };
                let reasons = score_lost_vs_found(&lost_input, &found_input).reasons;
                let score = row
                    .match_score
                    .to_f64()
                    .map(|v| v.round() as i64)
                    .unwrap_or(0);

                PotentialOwner {
                    lost_id: row.lost_id,
                    item_name: row.item_name,
                    description: row.description,
                    date_lost: row.date_lost,
                    status: row.status,
                    category_name: row.category_name,
                    location_name: row.location_name,
                    owner_name: row.owner_name,
                    owner_email: row.owner_email,
                    score,
                    reasons,
                }
            })
            .collect();

        Ok(owners)
    }

    /// 导出某挂失单的全部落库匹配为 CSV (工作人员/管理员)
    pub async fn export_matches(
        &self,
        caller: &Caller,
        lost_id: i64,
    ) -> Result<String, MatchError> {
        Self::authorize_privileged(caller)?;

        // 确认挂失单存在, 避免为不存在的ID导出空文件
        self.store
            .lost_report(lost_id)
            .await?
            .ok_or_else(|| MatchError::lost_not_found(lost_id))?;

        let rows = self.store.matches_for_lost(lost_id).await?;
        queries::render_matches_csv(&rows).map_err(|e| MatchError::Export(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoundCandidate, FoundItem, OwnerRow, StoredMatchRow};
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 内存实现: 行为与 SQL 层一致 (过滤/排序/截断/跳重)
    #[derive(Default)]
    struct MemStore {
        lost: Vec<LostReport>,
        found: Vec<FoundCandidate>,
        matches: Mutex<HashMap<i64, Vec<MatchRecord>>>,
    }

    impl MemStore {
        fn stored_for(&self, lost_id: i64) -> Vec<MatchRecord> {
            self.matches
                .lock()
                .unwrap()
                .get(&lost_id)
                .cloned()
                .unwrap_or_default()
        }

        fn seed_match(&self, lost_id: i64, found_id: i64, score: i64) {
            self.matches
                .lock()
                .unwrap()
                .entry(lost_id)
                .or_default()
                .push(MatchRecord::new(lost_id, found_id, score));
        }

        fn narrow(f: &FoundCandidate) -> FoundItem {
            FoundItem {
                found_id: f.found_id,
                item_name: f.item_name.clone(),
                description: f.description.clone(),
                category_id: f.category_id,
                location_id: f.location_id,
                date_found: f.date_found,
                status: f.status.clone(),
            }
        }
    }

    #[async_trait]
    impl MatchStore for MemStore {
        async fn lost_report(&self, lost_id: i64) -> Result<Option<LostReport>, sqlx::Error> {
            Ok(self.lost.iter().find(|l| l.lost_id == lost_id).cloned())
        }

        async fn found_item(&self, found_id: i64) -> Result<Option<FoundItem>, sqlx::Error> {
            Ok(self
                .found
                .iter()
                .find(|f| f.found_id == found_id)
                .map(Self::narrow))
        }

        async fn found_candidates(
            &self,
            category_id: i64,
            location_id: i64,
        ) -> Result<Vec<FoundCandidate>, sqlx::Error> {
            Ok(self
                .found
                .iter()
                .filter(|f| f.category_id == category_id || f.location_id == location_id)
                .take(100)
                .cloned()
                .collect())
        }

        async fn available_found_candidates(
            &self,
            category_id: i64,
            location_id: i64,
        ) -> Result<Vec<FoundItem>, sqlx::Error> {
            Ok(self
                .found
                .iter()
                .filter(|f| f.status == "NEWLY_FOUND")
                .filter(|f| f.category_id == category_id || f.location_id == location_id)
                .take(100)
                .map(Self::narrow)
                .collect())
        }

        async fn open_lost_reports(
            &self,
            category_id: i64,
            location_id: i64,
        ) -> Result<Vec<LostReport>, sqlx::Error> {
            Ok(self
                .lost
                .iter()
                .filter(|l| l.status == "REPORTED_LOST")
                .filter(|l| l.category_id == category_id || l.location_id == location_id)
                .take(80)
                .cloned()
                .collect())
        }

        async fn replace_matches(
            &self,
            lost_id: i64,
            records: &[MatchRecord],
        ) -> Result<(), sqlx::Error> {
            let mut matches = self.matches.lock().unwrap();
            matches.insert(lost_id, records.to_vec());
            Ok(())
        }

        async fn insert_matches(&self, records: &[MatchRecord]) -> Result<u64, sqlx::Error> {
            let mut matches = self.matches.lock().unwrap();
            let mut inserted = 0;
            for record in records {
                let rows = matches.entry(record.lost_id).or_default();
                if !rows.iter().any(|r| r.found_id == record.found_id) {
                    rows.push(record.clone());
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn matches_for_found(&self, found_id: i64) -> Result<Vec<OwnerRow>, sqlx::Error> {
            let matches = self.matches.lock().unwrap();
            let mut rows: Vec<OwnerRow> = matches
                .values()
                .flatten()
                .filter(|r| r.found_id == found_id)
                .filter_map(|r| {
                    self.lost.iter().find(|l| l.lost_id == r.lost_id).map(|l| OwnerRow {
                        match_score: r.match_score.clone(),
                        lost_id: l.lost_id,
                        user_id: l.user_id,
                        item_name: l.item_name.clone(),
                        description: l.description.clone(),
                        category_id: l.category_id,
                        location_id: l.location_id,
                        date_lost: l.date_lost,
                        status: l.status.clone(),
                        category_name: format!("category-{}", l.category_id),
                        location_name: format!("location-{}", l.location_id),
                        owner_name: format!("User {}", l.user_id),
                        owner_email: format!("user{}@campus.edu", l.user_id),
                    })
                })
                .collect();
            rows.sort_by(|a, b| b.match_score.cmp(&a.match_score));
            rows.truncate(10);
            Ok(rows)
        }

        async fn matches_for_lost(&self, lost_id: i64) -> Result<Vec<StoredMatchRow>, sqlx::Error> {
            let matches = self.matches.lock().unwrap();
            let mut rows: Vec<StoredMatchRow> = matches
                .get(&lost_id)
                .into_iter()
                .flatten()
                .filter_map(|r| {
                    self.found.iter().find(|f| f.found_id == r.found_id).map(|f| StoredMatchRow {
                        lost_id: r.lost_id,
                        found_id: r.found_id,
                        item_name: f.item_name.clone(),
                        status: f.status.clone(),
                        match_score: r.match_score.clone(),
                    })
                })
                .collect();
            rows.sort_by(|a, b| b.match_score.cmp(&a.match_score));
            Ok(rows)
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    fn lost_report(lost_id: i64, user_id: i64, name: &str, desc: Option<&str>) -> LostReport {
        LostReport {
            lost_id,
            user_id,
            item_name: name.to_string(),
            description: desc.map(|d| d.to_string()),
            category_id: 1,
            location_id: 1,
            date_lost: day(10),
            status: "REPORTED_LOST".to_string(),
        }
    }

    fn found_candidate(
        found_id: i64,
        name: &str,
        category_id: i64,
        location_id: i64,
        date_found: DateTime<Utc>,
        status: &str,
    ) -> FoundCandidate {
        FoundCandidate {
            found_id,
            item_name: name.to_string(),
            description: None,
            category_id,
            location_id,
            date_found,
            image: None,
            status: status.to_string(),
            category_name: format!("category-{}", category_id),
            location_name: format!("location-{}", location_id),
        }
    }

    fn owner() -> Caller {
        Caller { user_id: 7, role: Role::User }
    }

    fn staff() -> Caller {
        Caller { user_id: 99, role: Role::Staff }
    }

    fn wallet_store() -> MemStore {
        // 挂失: Blue Wallet / leather / 类别1 / 地点1 / 3月10日
        // f1 全中=100, f2 类别+日期+关键词=75, f3 仅类别=40, f4 仅地点=25
        MemStore {
            lost: vec![lost_report(1, 7, "Blue Wallet", Some("leather"))],
            found: vec![
                found_candidate(101, "Blue Leather Wallet", 1, 1, day(10), "NEWLY_FOUND"),
                found_candidate(102, "Blue Leather Wallet", 1, 2, day(10), "CLAIMED"),
                found_candidate(103, "Calculator", 1, 2, day(28), "NEWLY_FOUND"),
                found_candidate(104, "Calculator", 2, 1, day(28), "NEWLY_FOUND"),
            ],
            matches: Mutex::new(HashMap::new()),
        }
    }

    #[tokio::test]
    async fn test_refresh_scores_and_order() {
        let service = MatchService::new(wallet_store());

        let outcome = service.refresh_matches(&owner(), 1).await.unwrap();

        assert_eq!(outcome.lost.lost_id, 1);
        assert_eq!(outcome.lost.item_name, "Blue Wallet");
        assert_eq!(outcome.stored_count, 4);

        let shown: Vec<(i64, i64)> = outcome.matches.iter().map(|m| (m.found_id, m.score)).collect();
        assert_eq!(shown, vec![(101, 100), (102, 75), (103, 40), (104, 25)]);
    }

    #[tokio::test]
    async fn test_refresh_threshold_laws() {
        let store = wallet_store();
        let service = MatchService::new(store);

        let outcome = service.refresh_matches(&owner(), 1).await.unwrap();

        assert!(outcome.matches.len() <= 10);
        assert!(outcome.stored_count <= 30);
        for m in &outcome.matches {
            assert!(m.score >= 25);
        }

        let stored = service.store.stored_for(1);
        assert_eq!(stored.len(), outcome.stored_count);
        for r in &stored {
            assert!(r.match_score >= BigDecimal::from(20));
        }
        // 展示集是落库门槛子集: 展示的每个 found_id 都已落库
        for m in &outcome.matches {
            assert!(stored.iter().any(|r| r.found_id == m.found_id));
        }
    }

    #[tokio::test]
    async fn test_refresh_truncation() {
        // 35 个仅类别命中的候选 (各 40 分): 落库 30, 展示 10
        let found: Vec<FoundCandidate> = (0..35)
            .map(|i| found_candidate(200 + i, "Calculator", 1, 2, day(28), "NEWLY_FOUND"))
            .collect();
        let store = MemStore {
            lost: vec![lost_report(1, 7, "Blue Wallet", Some("leather"))],
            found,
            matches: Mutex::new(HashMap::new()),
        };
        let service = MatchService::new(store);

        let outcome = service.refresh_matches(&owner(), 1).await.unwrap();

        assert_eq!(outcome.stored_count, 30);
        assert_eq!(outcome.matches.len(), 10);
        assert_eq!(service.store.stored_for(1).len(), 30);
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_set() {
        let store = wallet_store();
        store.seed_match(1, 999, 55);

        let service = MatchService::new(store);
        service.refresh_matches(&owner(), 1).await.unwrap();

        let stored = service.store.stored_for(1);
        assert!(!stored.iter().any(|r| r.found_id == 999));
        assert_eq!(stored.len(), 4);
    }

    #[tokio::test]
    async fn test_refresh_leaves_other_reports_untouched() {
        let mut store = wallet_store();
        store.lost.push(lost_report(2, 8, "Red Umbrella", None));
        store.seed_match(2, 555, 60);

        let service = MatchService::new(store);
        service.refresh_matches(&owner(), 1).await.unwrap();

        let other = service.store.stored_for(2);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].found_id, 555);
    }

    #[tokio::test]
    async fn test_refresh_idempotent() {
        let service = MatchService::new(wallet_store());

        let first = service.refresh_matches(&owner(), 1).await.unwrap();
        let stored_first = service.store.stored_for(1);

        let second = service.refresh_matches(&owner(), 1).await.unwrap();
        let stored_second = service.store.stored_for(1);

        assert_eq!(first.stored_count, second.stored_count);
        let shown_first: Vec<(i64, i64)> = first.matches.iter().map(|m| (m.found_id, m.score)).collect();
        let shown_second: Vec<(i64, i64)> = second.matches.iter().map(|m| (m.found_id, m.score)).collect();
        assert_eq!(shown_first, shown_second);

        let pairs = |rows: &[MatchRecord]| -> Vec<(i64, BigDecimal)> {
            rows.iter().map(|r| (r.found_id, r.match_score.clone())).collect()
        };
        assert_eq!(pairs(&stored_first), pairs(&stored_second));
    }

    #[tokio::test]
    async fn test_refresh_not_found() {
        let service = MatchService::new(MemStore::default());

        let err = service.refresh_matches(&owner(), 42).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_refresh_authorization() {
        let service = MatchService::new(wallet_store());

        // 他人的普通用户被拒
        let stranger = Caller { user_id: 8, role: Role::User };
        let err = service.refresh_matches(&stranger, 1).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden));

        // 工作人员放行
        assert!(service.refresh_matches(&staff(), 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_seed_for_lost_only_available_items() {
        let service = MatchService::new(wallet_store());

        let outcome = service.seed_for_lost(&owner(), 1).await.unwrap();

        // f102 (CLAIMED) 不在种子候选池里
        let stored = service.store.stored_for(1);
        assert!(!stored.iter().any(|r| r.found_id == 102));
        assert_eq!(outcome.stored_count, 3);

        // 最强匹配是满分的 f101
        let best = outcome.best_strong.unwrap();
        assert_eq!(best.found_id, 101);
        assert_eq!(best.score, 100);
        assert!(best.reasons.contains(&"Same category".to_string()));
    }

    #[tokio::test]
    async fn test_seed_for_lost_keeps_existing_pairs() {
        let store = wallet_store();
        store.seed_match(1, 101, 33);

        let service = MatchService::new(store);
        let outcome = service.seed_for_lost(&owner(), 1).await.unwrap();

        // 已有配对跳过: 3 条候选中只新增 2 条, 旧分值不被覆盖
        assert_eq!(outcome.stored_count, 3);
        let stored = service.store.stored_for(1);
        let existing = stored.iter().find(|r| r.found_id == 101).unwrap();
        assert_eq!(existing.match_score, BigDecimal::from(33).with_scale(2));
    }

    #[tokio::test]
    async fn test_seed_for_lost_no_strong_match() {
        let store = MemStore {
            lost: vec![lost_report(1, 7, "Blue Wallet", Some("leather"))],
            found: vec![found_candidate(104, "Calculator", 2, 1, day(28), "NEWLY_FOUND")],
            matches: Mutex::new(HashMap::new()),
        };
        let service = MatchService::new(store);

        let outcome = service.seed_for_lost(&owner(), 1).await.unwrap();

        // 仅地点命中 25 分: 落库但构不成强匹配
        assert_eq!(outcome.stored_count, 1);
        assert!(outcome.best_strong.is_none());
    }

    #[tokio::test]
    async fn test_seed_for_found_requires_privilege() {
        let service = MatchService::new(wallet_store());

        let err = service.seed_for_found(&owner(), 101).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden));
    }

    #[tokio::test]
    async fn test_seed_for_found_inserts_and_alerts_best_per_user() {
        // 用户 7 有两张挂失单, 用户 8 一张; 全部强匹配
        let store = MemStore {
            lost: vec![
                lost_report(1, 7, "Blue Wallet", Some("leather")),
                lost_report(2, 7, "Blue Wallet", None),
                lost_report(3, 8, "Wallet", None),
            ],
            found: vec![found_candidate(101, "Blue Leather Wallet", 1, 1, day(10), "NEWLY_FOUND")],
            matches: Mutex::new(HashMap::new()),
        };
        let service = MatchService::new(store);

        let outcome = service.seed_for_found(&staff(), 101).await.unwrap();

        assert_eq!(outcome.inserted, 3);
        // 用户 7 只收到分值更高的 1 号单的通知
        assert_eq!(outcome.alerts.len(), 2);
        let alert7 = outcome.alerts.iter().find(|a| a.user_id == 7).unwrap();
        assert_eq!(alert7.lost_id, 1);
        assert_eq!(alert7.score, 100);
        assert!(outcome.alerts.iter().any(|a| a.user_id == 8));
    }

    #[tokio::test]
    async fn test_seed_for_found_skips_closed_reports() {
        let mut closed = lost_report(4, 9, "Blue Wallet", Some("leather"));
        closed.status = "CANCELLED".to_string();

        let store = MemStore {
            lost: vec![closed],
            found: vec![found_candidate(101, "Blue Leather Wallet", 1, 1, day(10), "NEWLY_FOUND")],
            matches: Mutex::new(HashMap::new()),
        };
        let service = MatchService::new(store);

        let outcome = service.seed_for_found(&staff(), 101).await.unwrap();

        assert_eq!(outcome.inserted, 0);
        assert!(outcome.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_potential_owners_recomputes_reasons() {
        let service = MatchService::new(wallet_store());
        service.refresh_matches(&owner(), 1).await.unwrap();

        let owners = service.potential_owners(&staff(), 101).await.unwrap();

        assert_eq!(owners.len(), 1);
        let top = &owners[0];
        assert_eq!(top.lost_id, 1);
        assert_eq!(top.score, 100);
        assert_eq!(top.owner_email, "user7@campus.edu");
        // 原因为现算结果, 与落库无关
        assert_eq!(
            top.reasons,
            vec![
                "Same category".to_string(),
                "Same location".to_string(),
                "Date is within 1 day".to_string(),
                "3 shared keyword(s)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_potential_owners_requires_privilege() {
        let service = MatchService::new(wallet_store());

        let err = service.potential_owners(&owner(), 101).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden));
    }

    #[tokio::test]
    async fn test_potential_owners_found_missing() {
        let service = MatchService::new(wallet_store());

        let err = service.potential_owners(&staff(), 404).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound { id: 404, .. }));
    }

    #[tokio::test]
    async fn test_export_matches() {
        let service = MatchService::new(wallet_store());
        service.refresh_matches(&owner(), 1).await.unwrap();

        let csv = service.export_matches(&staff(), 1).await.unwrap();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("lost_id,found_id,item_name,status,match_score"));
        assert_eq!(lines.next(), Some("1,101,Blue Leather Wallet,NEWLY_FOUND,100.00"));
        assert_eq!(csv.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_export_requires_privilege() {
        let service = MatchService::new(wallet_store());

        let err = service.export_matches(&owner(), 1).await.unwrap_err();
        assert!(matches!(err, MatchError::Forbidden));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("STAFF"), Some(Role::Staff));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("staff"), None);
    }

    #[test]
    fn test_date_band_scoring_through_service_inputs() {
        // 服务层构造的输入与评分器口径一致: 毫秒截断, 不对齐日历日
        let lost = lost_report(1, 7, "Blue Wallet", Some("leather"));
        let lost_input = MatchInput::from_lost(&lost);
        let candidate = found_candidate(101, "Notebook", 1, 2, day(10) + Duration::hours(23), "NEWLY_FOUND");
        let result = score_lost_vs_found(&lost_input, &MatchInput::from_candidate(&candidate));
        // 类别 40 + 日期 15 (23 小时 -> 0 天)
        assert_eq!(result.score, 55);
    }
}
