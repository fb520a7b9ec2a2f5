use crate::models::{FoundCandidate, FoundItem, LostReport, MatchRecord, OwnerRow, StoredMatchRow};
use sqlx::PgPool;

/// 查询挂失单
pub async fn get_lost_report(
    pool: &PgPool,
    lost_id: i64,
) -> Result<Option<LostReport>, sqlx::Error> {
    sqlx::query_as::<_, LostReport>(
        r#"
        SELECT lost_id, user_id, item_name, description,
               category_id, location_id, date_lost, status
        FROM lost_items
        WHERE lost_id = $1
        "#
    )
    .bind(lost_id)
    .fetch_optional(pool)
    .await
}

/// 查询拾得物品
pub async fn get_found_item(
    pool: &PgPool,
    found_id: i64,
) -> Result<Option<FoundItem>, sqlx::Error> {
    sqlx::query_as::<_, FoundItem>(
        r#"
        SELECT found_id, item_name, description,
               category_id, location_id, date_found, status
        FROM found_items
        WHERE found_id = $1
        "#
    )
    .bind(found_id)
    .fetch_optional(pool)
    .await
}

/// 查询刷新候选: 同类别或同地点的拾得物品 (不过滤状态, 封顶 100 条)
///
/// 已认领/已归还的物品仍参与评分, 可否认领由展示层决定。
pub async fn list_found_candidates(
    pool: &PgPool,
    category_id: i64,
    location_id: i64,
) -> Result<Vec<FoundCandidate>, sqlx::Error> {
    sqlx::query_as::<_, FoundCandidate>(
        r#"
        SELECT fi.found_id, fi.item_name, fi.description,
               fi.category_id, fi.location_id, fi.date_found,
               fi.image, fi.status,
               c.category_name, l.location_name
        FROM found_items fi
        INNER JOIN categories c ON c.category_id = fi.category_id
        INNER JOIN locations l ON l.location_id = fi.location_id
        WHERE fi.category_id = $1 OR fi.location_id = $2
        LIMIT 100
        "#
    )
    .bind(category_id)
    .bind(location_id)
    .fetch_all(pool)
    .await
}

/// 查询种子候选: 仍在架的拾得物品 (status = NEWLY_FOUND, 封顶 100 条)
pub async fn list_available_found_candidates(
    pool: &PgPool,
    category_id: i64,
    location_id: i64,
) -> Result<Vec<FoundItem>, sqlx::Error> {
    sqlx::query_as::<_, FoundItem>(
        r#"
        SELECT found_id, item_name, description,
               category_id, location_id, date_found, status
        FROM found_items
        WHERE status = 'NEWLY_FOUND'
          AND (category_id = $1 OR location_id = $2)
        LIMIT 100
        "#
    )
    .bind(category_id)
    .bind(location_id)
    .fetch_all(pool)
    .await
}

/// 查询反向种子候选: 仍挂失中的报告 (status = REPORTED_LOST, 封顶 80 条)
pub async fn list_open_lost_reports(
    pool: &PgPool,
    category_id: i64,
    location_id: i64,
) -> Result<Vec<LostReport>, sqlx::Error> {
    sqlx::query_as::<_, LostReport>(
        r#"
        SELECT lost_id, user_id, item_name, description,
               category_id, location_id, date_lost, status
        FROM lost_items
        WHERE status = 'REPORTED_LOST'
          AND (category_id = $1 OR location_id = $2)
        LIMIT 80
        "#
    )
    .bind(category_id)
    .bind(location_id)
    .fetch_all(pool)
    .await
}

/// 整体置换某挂失单名下的匹配集 (单事务: 先删后插, 外部观测不到中间态)
///
/// 同一 lost_id 的并发刷新由该事务串行化; 不同 lost_id 互不影响。
pub async fn replace_matches(
    pool: &PgPool,
    lost_id: i64,
    records: &[MatchRecord],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM matches WHERE lost_id = $1")
        .bind(lost_id)
        .execute(&mut *tx)
        .await?;

    if !records.is_empty() {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO matches (lost_id, found_id, match_score) "
        );
        query_builder.push_values(records, |mut b, record| {
            b.push_bind(record.lost_id)
                .push_bind(record.found_id)
                .push_bind(record.match_score.clone());
        });
        query_builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::debug!("Replaced matches for lost report {}: {} rows", lost_id, records.len());
    Ok(())
}

/// 批量插入匹配 (已存在的 lost_id + found_id 对跳过), 返回实际插入条数
pub async fn insert_matches(
    pool: &PgPool,
    records: &[MatchRecord],
) -> Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO matches (lost_id, found_id, match_score) "
    );
    query_builder.push_values(records, |mut b, record| {
        b.push_bind(record.lost_id)
            .push_bind(record.found_id)
            .push_bind(record.match_score.clone());
    });
    query_builder.push(" ON CONFLICT (lost_id, found_id) DO NOTHING");

    let result = query_builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// 查询某拾得物品名下的匹配 (按分值降序, 取前 10) + 挂失单/报失人信息
pub async fn list_matches_for_found(
    pool: &PgPool,
    found_id: i64,
) -> Result<Vec<OwnerRow>, sqlx::Error> {
    sqlx::query_as::<_, OwnerRow>(
        r#"
        SELECT m.match_score,
               li.lost_id, li.user_id, li.item_name, li.description,
               li.category_id, li.location_id, li.date_lost, li.status,
               c.category_name, l.location_name,
               u.full_name AS owner_name, u.email AS owner_email
        FROM matches m
        INNER JOIN lost_items li ON li.lost_id = m.lost_id
        INNER JOIN categories c ON c.category_id = li.category_id
        INNER JOIN locations l ON l.location_id = li.location_id
        INNER JOIN users u ON u.user_id = li.user_id
        WHERE m.found_id = $1
        ORDER BY m.match_score DESC
        LIMIT 10
        "#
    )
    .bind(found_id)
    .fetch_all(pool)
    .await
}

/// 查询某挂失单名下的全部落库匹配 (按分值降序), 用于导出
pub async fn list_matches_for_lost(
    pool: &PgPool,
    lost_id: i64,
) -> Result<Vec<StoredMatchRow>, sqlx::Error> {
    sqlx::query_as::<_, StoredMatchRow>(
        r#"
        SELECT m.lost_id, m.found_id, fi.item_name, fi.status, m.match_score
        FROM matches m
        INNER JOIN found_items fi ON fi.found_id = m.found_id
        WHERE m.lost_id = $1
        ORDER BY m.match_score DESC
        "#
    )
    .bind(lost_id)
    .fetch_all(pool)
    .await
}

/// 将落库匹配渲染为 CSV 文本
pub fn render_matches_csv(
    rows: &[StoredMatchRow],
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    use csv::Writer;

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["lost_id", "found_id", "item_name", "status", "match_score"])?;

    for row in rows {
        writer.write_record(&[
            row.lost_id.to_string(),
            row.found_id.to_string(),
            row.item_name.clone(),
            row.status.clone(),
            row.match_score.to_string(),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
