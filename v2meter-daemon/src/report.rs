//! Usage delivery to the remote collector.

use std::time::Duration;

use v2meter_core::{Settings, StatsSnapshot};

use crate::error::ReportError;

/// Destination for one cycle's snapshot. Delivery is blocking; the runtime
/// calls it from the blocking pool.
pub trait UsageSink: Send + Sync {
    /// Deliver `snapshot`, returning the collector's HTTP status on success.
    fn report(&self, snapshot: &StatsSnapshot) -> Result<u16, ReportError>;
}

/// `POST <report_url>?uuid=<uuid>` with the snapshot as a JSON body.
pub struct HttpReporter {
    agent: ureq::Agent,
    url: String,
    uuid: String,
}

impl HttpReporter {
    pub fn new(settings: &Settings) -> Self {
        Self::with_timeout(
            &settings.report_url,
            &settings.identity.uuid,
            settings.http_timeout(),
        )
    }

    pub fn with_timeout(url: &str, uuid: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url: url.to_string(),
            uuid: uuid.to_string(),
        }
    }
}

impl UsageSink for HttpReporter {
    fn report(&self, snapshot: &StatsSnapshot) -> Result<u16, ReportError> {
        tracing::info!(uuid = %self.uuid, %snapshot, "reporting stats");
        let sent = self
            .agent
            .post(&self.url)
            .query("uuid", &self.uuid)
            .set("Content-Type", "application/json")
            .send_json(snapshot);

        match sent {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Err(ReportError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                Err(ReportError::Transport(transport.to_string()))
            }
        }
    }
}
