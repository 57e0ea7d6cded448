use super::category::CategoryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task row as mirrored in the local cache. Logs reference it by `id` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

fn default_status() -> String {
    "todo".to_string()
}
