use crate::db::PgMatchStore;
use crate::error::MatchError;
use crate::models::{DisplayMatch, LostSummary, OwnerAlert, PotentialOwner, StrongMatch};
use crate::service::{Caller, MatchService, Role};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type Service = Arc<MatchService<PgMatchStore>>;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 刷新请求参数
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub lost_id: i64,
}

/// 刷新响应体: 挂失单摘要 + 展示集 (最多 10 条)
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub lost: LostSummary,
    pub stored_count: usize,
    pub matches: Vec<DisplayMatch>,
}

/// 潜在失主响应体
#[derive(Debug, Serialize)]
pub struct OwnersResponse {
    pub success: bool,
    pub found_id: i64,
    pub owners: Vec<PotentialOwner>,
}

/// 种子匹配请求体 (挂失侧)
#[derive(Debug, Deserialize)]
pub struct SeedLostRequest {
    pub lost_id: i64,
}

/// 种子匹配响应体 (挂失侧)
#[derive(Debug, Serialize)]
pub struct SeedLostResponse {
    pub success: bool,
    pub lost_id: i64,
    pub stored_count: usize,
    pub best_strong: Option<StrongMatch>,
}

/// 种子匹配请求体 (拾得侧)
#[derive(Debug, Deserialize)]
pub struct SeedFoundRequest {
    pub found_id: i64,
}

/// 种子匹配响应体 (拾得侧)
#[derive(Debug, Serialize)]
pub struct SeedFoundResponse {
    pub success: bool,
    pub found_id: i64,
    pub inserted: u64,
    pub alerts: Vec<OwnerAlert>,
}

/// 导出请求参数
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub lost_id: i64,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 从网关注入的身份头解析调用方 (x-user-id / x-user-role)
///
/// 认证在上游完成, 这里只还原身份; 头缺失或非法一律按未认证处理。
fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    let user_id = headers.get("x-user-id")?.to_str().ok()?.parse().ok()?;
    let role = Role::parse(headers.get("x-user-role")?.to_str().ok()?)?;
    Some(Caller { user_id, role })
}

fn unauthorized() -> Response {
    let body = ErrorResponse {
        success: false,
        message: "Missing or invalid identity headers".to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

fn error_response(e: MatchError) -> Response {
    let status = match &e {
        MatchError::NotFound { .. } => StatusCode::NOT_FOUND,
        MatchError::Forbidden => StatusCode::FORBIDDEN,
        MatchError::Storage(_) | MatchError::Export(_) => {
            tracing::error!("Match operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = ErrorResponse {
        success: false,
        message: e.to_string(),
    };
    (status, Json(body)).into_response()
}

/// 刷新接口: 重算并整体置换某挂失单的候选匹配集
pub async fn suggest_matches(
    State(service): State<Service>,
    headers: HeaderMap,
    Query(params): Query<SuggestParams>,
) -> Response {
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthorized();
    };

    match service.refresh_matches(&caller, params.lost_id).await {
        Ok(outcome) => {
            let response = SuggestResponse {
                success: true,
                lost: outcome.lost,
                stored_count: outcome.stored_count,
                matches: outcome.matches,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 潜在失主接口: 某拾得物品名下的匹配 (工作人员/管理员)
pub async fn potential_owners(
    State(service): State<Service>,
    headers: HeaderMap,
    Path(found_id): Path<i64>,
) -> Response {
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthorized();
    };

    match service.potential_owners(&caller, found_id).await {
        Ok(owners) => {
            let response = OwnersResponse {
                success: true,
                found_id,
                owners,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 种子匹配接口 (挂失侧): 挂失单创建后由上游调用
pub async fn seed_lost(
    State(service): State<Service>,
    headers: HeaderMap,
    Json(req): Json<SeedLostRequest>,
) -> Response {
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthorized();
    };

    match service.seed_for_lost(&caller, req.lost_id).await {
        Ok(outcome) => {
            let response = SeedLostResponse {
                success: true,
                lost_id: outcome.lost_id,
                stored_count: outcome.stored_count,
                best_strong: outcome.best_strong,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 种子匹配接口 (拾得侧): 拾得物品登记后由上游调用
pub async fn seed_found(
    State(service): State<Service>,
    headers: HeaderMap,
    Json(req): Json<SeedFoundRequest>,
) -> Response {
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthorized();
    };

    match service.seed_for_found(&caller, req.found_id).await {
        Ok(outcome) => {
            let response = SeedFoundResponse {
                success: true,
                found_id: outcome.found_id,
                inserted: outcome.inserted,
                alerts: outcome.alerts,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 导出接口: 某挂失单的落库匹配 CSV (工作人员/管理员)
pub async fn export_matches(
    State(service): State<Service>,
    headers: HeaderMap,
    Query(params): Query<ExportParams>,
) -> Response {
    let Some(caller) = caller_from_headers(&headers) else {
        return unauthorized();
    };

    match service.export_matches(&caller, params.lost_id).await {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
