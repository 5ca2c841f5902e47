//! Loki push client.
//!
//! Batches are grouped into one stream per level and sent as JSON to
//! `<host>/loki/api/v1/push`. Each entry carries the emission timestamp of
//! its record, which Loki stores as the entry time.

use crate::domain::{LogRecord, LogSink};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Serialize, PartialEq)]
struct PushRequest<'a> {
    streams: Vec<Stream<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Stream<'a> {
    stream: BTreeMap<&'static str, &'a str>,
    values: Vec<[String; 2]>,
}

/// Delivers log batches to a Loki instance over HTTP.
pub struct LokiSink {
    client: reqwest::Client,
    push_url: String,
    job: String,
}

impl LokiSink {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(host: &str, job: impl Into<String>, timeout: Duration) -> Result<Self> {
        // ---
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Loki HTTP client")?;

        Ok(Self {
            client,
            push_url: format!("{}/loki/api/v1/push", host.trim_end_matches('/')),
            job: job.into(),
        })
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }

    fn payload<'a>(&'a self, batch: &[LogRecord]) -> PushRequest<'a> {
        // ---
        let mut by_level: BTreeMap<&'static str, Vec<[String; 2]>> = BTreeMap::new();
        for record in batch {
            by_level
                .entry(record.level.as_str())
                .or_default()
                .push([record.timestamp_ns.to_string(), record.to_json_line()]);
        }

        let streams = by_level
            .into_iter()
            .map(|(level, values)| Stream {
                stream: BTreeMap::from([("job", self.job.as_str()), ("level", level)]),
                values,
            })
            .collect();

        PushRequest { streams }
    }
}

#[async_trait::async_trait]
impl LogSink for LokiSink {
    // ---
    async fn push(&self, batch: &[LogRecord]) -> Result<()> {
        // ---
        if batch.is_empty() {
            return Ok(());
        }

        self.client
            .post(&self.push_url)
            .json(&self.payload(batch))
            .send()
            .await
            .with_context(|| format!("Loki push to {} failed", self.push_url))?
            .error_for_status()
            .context("Loki rejected log batch")?;

        tracing::debug!(records = batch.len(), "Pushed log batch to Loki");
        Ok(())
    }
}
