use serde::Serialize;

/// Pagination block included alongside list responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_page: i64,
}

impl Meta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_page = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_page,
        }
    }
}

/// Standard success envelope: `{success, message, data, meta?, stats?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            meta: None,
            stats: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_stats(mut self, stats: impl Serialize) -> Self {
        self.stats = serde_json::to_value(stats).ok();
        self
    }
}
