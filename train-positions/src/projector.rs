//! Projection of raw position records into [`Train`] values, and output.
//!
//! Records are projected in reply order (group by group) and never
//! re-sorted: the service already orders them as the query asked. A record
//! that cannot be projected is skipped and reported; the rest of the batch
//! still goes out.

use std::io::{self, Write};

use tracing::warn;

use crate::domain::{FormatError, GeoPoint, Train, TrainNumber};
use crate::trafikinfo::{PositionRecord, ReplyEnvelope};

/// What to do with records the service has flagged as deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletedPolicy {
    /// Project deleted records like any other.
    #[default]
    Include,
    /// Drop deleted records before projection.
    Exclude,
}

/// A record that could not be projected.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the record in the flattened reply
    pub index: usize,
    pub error: FormatError,
}

/// Result of projecting a whole reply.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub trains: Vec<Train>,
    pub skipped: Vec<SkippedRecord>,
}

/// Project a single record.
pub fn project_record(record: &PositionRecord) -> Result<Train, FormatError> {
    let number = record
        .train
        .as_ref()
        .and_then(|t| t.advertised_train_number.as_deref())
        .ok_or(FormatError::MissingField("Train.AdvertisedTrainNumber"))?;
    let number = TrainNumber::parse(number)?;

    let wgs84 = record
        .position
        .as_ref()
        .and_then(|p| p.wgs84.as_deref())
        .ok_or(FormatError::MissingField("Position.WGS84"))?;
    let point = GeoPoint::parse(wgs84)?;

    Ok(Train {
        latitude: point.latitude(),
        longitude: point.longitude(),
        number,
        bearing: record.bearing,
        speed: record.speed,
        timestamp: record.time_stamp.map(|t| t.to_rfc3339()),
    })
}

/// Project every record in the reply, in reply order.
pub fn project(reply: &ReplyEnvelope, policy: DeletedPolicy) -> Projection {
    let mut projection = Projection::default();

    for (index, record) in reply.records().enumerate() {
        if policy == DeletedPolicy::Exclude && record.is_deleted() {
            continue;
        }
        match project_record(record) {
            Ok(train) => projection.trains.push(train),
            Err(error) => {
                warn!(index, %error, "skipping position record");
                projection.skipped.push(SkippedRecord { index, error });
            }
        }
    }

    projection
}

/// Format one output line.
pub fn render_line(index: usize, train: &Train) -> String {
    let speed = match train.speed {
        Some(s) => s.to_string(),
        None => "?".to_string(),
    };
    format!(
        "{index}: train {} running at {speed} km/h, at {}, {}",
        train.number, train.latitude, train.longitude
    )
}

/// Write one line per train to `out`, numbered from 0.
pub fn write_trains<W: Write>(out: &mut W, trains: &[Train]) -> io::Result<()> {
    for (index, train) in trains.iter().enumerate() {
        writeln!(out, "{}", render_line(index, train))?;
    }
    out.flush()
}
