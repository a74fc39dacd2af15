//! One pass of the pipeline: build query, send it, decode, project, print.
//!
//! Each stage's error is wrapped with the stage it came from, so the binary
//! has a single place that decides how to report a failure and which exit
//! code to use.

use std::io::{self, Write};

use tracing::{debug, info};

use crate::config::{AppConfig, ConfigError};
use crate::projector::{project, write_trains};
use crate::trafikinfo::{
    QueryDescriptor, QueryError, TrafikinfoClient, TrafikinfoError, decode_reply,
};

/// A fatal error, tagged with the pipeline stage that produced it.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("query: {0}")]
    Query(#[source] QueryError),

    #[error("transport: {0}")]
    Transport(#[source] TrafikinfoError),

    #[error("decode: {0}")]
    Decode(#[source] TrafikinfoError),

    /// The service answered but rejected the query
    #[error("service: {0}")]
    Service(#[source] TrafikinfoError),

    #[error("output: {0}")]
    Output(#[from] io::Error),
}

impl RunError {
    pub fn stage(&self) -> &'static str {
        match self {
            RunError::Config(_) => "config",
            RunError::Query(_) => "query",
            RunError::Transport(_) => "transport",
            RunError::Decode(_) => "decode",
            RunError::Service(_) => "service",
            RunError::Output(_) => "output",
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines written
    pub printed: usize,
    /// Records that could not be projected
    pub skipped: usize,
}

/// Run the pipeline once, writing one line per train to `out`.
pub async fn run<W: Write>(config: &AppConfig, out: &mut W) -> Result<RunSummary, RunError> {
    let descriptor =
        QueryDescriptor::new(&config.authentication_key, &config.query).map_err(RunError::Query)?;
    let query_xml = descriptor.to_xml().map_err(RunError::Query)?;
    if config.debug {
        let redacted = descriptor.to_redacted_xml().map_err(RunError::Query)?;
        debug!(query = %redacted, "serialized query");
    }

    let client = TrafikinfoClient::new(config.client.clone()).map_err(RunError::Transport)?;
    let body = client
        .post_query(query_xml)
        .await
        .map_err(RunError::Transport)?;

    let reply = decode_reply(&body).map_err(|e| match e {
        TrafikinfoError::Service { .. } => RunError::Service(e),
        e => RunError::Decode(e),
    })?;

    let projection = project(&reply, config.deleted_policy);
    write_trains(out, &projection.trains)?;

    let summary = RunSummary {
        printed: projection.trains.len(),
        skipped: projection.skipped.len(),
    };
    info!(printed = summary.printed, skipped = summary.skipped, "done");

    Ok(summary)
}
