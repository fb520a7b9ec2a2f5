use thiserror::Error;

/// 匹配服务错误分类
///
/// NotFound / Forbidden 对当次调用是终态, 不重试;
/// Storage 中止整次操作且无半写 (刷新幂等, 调用方可安全重试)。
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("caller is not the owner and lacks staff/admin privilege")]
    Forbidden,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("csv export failed: {0}")]
    Export(String),
}

impl MatchError {
    pub fn lost_not_found(id: i64) -> Self {
        Self::NotFound { entity: "lost report", id }
    }

    pub fn found_not_found(id: i64) -> Self {
        Self::NotFound { entity: "found item", id }
    }
}
