// ABOUTME: Append-only analytics event persisted by C2, read back in aggregate by C7
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed search, logged regardless of cache hit/miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query_text: String,
    pub search_mode: String,
    pub database_id: Option<Uuid>,
    pub result_count: u64,
    pub execution_time_ms: u64,
    pub created_at: DateTime<Utc>,
}
