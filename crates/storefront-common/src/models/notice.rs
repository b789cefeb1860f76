use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::trimmed;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: i64,
    pub title: String,
    pub details: String,
    /// Creation time, or time of the last edit
    pub time: DateTime<Utc>,
}

/// Body of POST and PUT /notices
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NoticeRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 2000, message = "details must be 1 to 2000 characters"))]
    pub details: String,
}
