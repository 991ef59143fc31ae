//! Row types served by the data service.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `items` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A row of the `football_clubs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FootballClub {
    pub id: i32,
    pub name: String,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// Body of `GET /data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub data: Vec<Item>,
}

/// Body of `GET /footballClub`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClubsResponse {
    pub clubs: Vec<FootballClub>,
}
