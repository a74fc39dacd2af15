//! Trafikinfo API response DTOs.
//!
//! These types map directly to the JSON reply for `TrainPosition` queries.
//! Every field is `Option` because the reply only carries the fields named
//! in the query's include list. Fields that are present are strictly typed:
//! a string where a boolean is expected fails the decode.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// The full reply: `{"RESPONSE": {"RESULT": [...]}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(rename = "RESPONSE")]
    pub response: ResponseBody,
}

impl ReplyEnvelope {
    /// Result groups, in reply order.
    pub fn groups(&self) -> &[ResultGroup] {
        &self.response.result
    }

    /// All position records, group by group, in reply order.
    pub fn records(&self) -> impl Iterator<Item = &PositionRecord> {
        self.groups().iter().flat_map(|g| g.train_position.iter())
    }

    /// The first service-reported error, if any group carries one.
    pub fn fault(&self) -> Option<&ServiceFault> {
        self.groups().iter().find_map(|g| g.error.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBody {
    /// One group per query in the request. Absent when nothing matched.
    #[serde(rename = "RESULT", default)]
    pub result: Vec<ResultGroup>,
}

/// Reply to a single query element.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultGroup {
    #[serde(rename = "TrainPosition", default)]
    pub train_position: Vec<PositionRecord>,

    /// Present instead of data when the service rejected the query.
    #[serde(rename = "ERROR")]
    pub error: Option<ServiceFault>,
}

/// Error object the service embeds in a result group.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceFault {
    #[serde(rename = "SOURCE")]
    pub source: Option<String>,

    #[serde(rename = "MESSAGE")]
    pub message: String,
}

/// One raw train position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PositionRecord {
    pub train: Option<TrainIdentity>,

    pub position: Option<Position>,

    /// When the position was measured.
    pub time_stamp: Option<DateTime<FixedOffset>>,

    pub status: Option<Status>,

    /// Direction of travel in degrees.
    pub bearing: Option<i32>,

    /// Speed in km/h.
    pub speed: Option<i32>,

    /// When the service last changed this record.
    pub modified_time: Option<DateTime<FixedOffset>>,

    /// Whether the record has been withdrawn by the service.
    pub deleted: Option<bool>,
}

impl PositionRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }
}

/// Train identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainIdentity {
    /// Operational train number (may differ from the advertised one).
    pub operational_train_number: Option<String>,

    pub operational_train_departure_date: Option<DateTime<FixedOffset>>,

    pub journey_plan_number: Option<String>,

    pub journey_plan_departure_date: Option<DateTime<FixedOffset>>,

    /// Train number shown to passengers, e.g. "542".
    pub advertised_train_number: Option<String>,
}

/// Position in both coordinate systems, as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    /// Planar SWEREF 99 TM point, e.g. "POINT (674032 6580821)".
    #[serde(rename = "SWEREF99TM")]
    pub sweref99tm: Option<String>,

    /// Geographic WGS84 point, e.g. "POINT (18.0686 59.3293)".
    #[serde(rename = "WGS84")]
    pub wgs84: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub active: Option<bool>,
}
