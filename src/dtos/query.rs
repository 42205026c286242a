//! Query DTOs - Data Transfer Objects per i query parameters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct OrganizationQuery {
    pub organization: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserQuery {
    pub user: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuizQuery {
    pub quiz: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct NotificationQuery {
    pub notification_id: i64,
}

/// Paginazione per la lista delle organizzazioni visibili
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
}

impl PageQuery {
    pub const PAGE_SIZE: i64 = 20;

    pub fn offset(&self) -> i64 {
        (self.page.unwrap_or(1).max(1) - 1) * Self::PAGE_SIZE
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DynamicScoresQuery {
    pub organization: i64,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DateRangeQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}
