//! Trafikinfo (Trafikverket open data API) client.
//!
//! This module builds queries against the Trafikinfo query protocol,
//! submits them over HTTP and decodes the replies.
//!
//! Key characteristics of Trafikinfo:
//! - Requests are XML documents POSTed to a single endpoint; the reply
//!   format is chosen by the endpoint suffix (`data.json` here)
//! - Filters are attribute pairs and may use relative-time expressions
//!   such as `$dateadd(-0.00:15:00)`, evaluated by the service
//! - Replies only carry the fields named in the query's include list
//! - Query errors come back as an `ERROR` object inside a 200 reply

mod client;
mod decode;
mod error;
mod query;
#[cfg(test)]
pub(crate) mod stub;
mod types;

pub use client::{DEFAULT_ENDPOINT, TrafikinfoClient, TrafikinfoConfig};
pub use decode::decode_reply;
pub use error::TrafikinfoError;
pub use query::{
    Filter, FilterOp, FilterValue, QueryConfig, QueryDescriptor, QueryError, RelativeTime,
    XML_HEADER,
};
pub use types::{
    Position, PositionRecord, ReplyEnvelope, ResponseBody, ResultGroup, ServiceFault, Status,
    TrainIdentity,
};
