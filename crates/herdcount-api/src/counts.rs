// Count endpoints
//
// Aggregates and record listings for the dashboard, plus the
// unauthenticated submission endpoint the sensor devices post to.

use secrecy::SecretString;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{CountCreated, CountList, CountRecord, CountStats, NewCount, TodayCounts};

impl ApiClient {
    /// Aggregate counters: `GET /counts/stats`.
    pub async fn count_stats(&self, token: &SecretString) -> Result<CountStats, Error> {
        self.get("counts/stats", Some(token)).await
    }

    /// Records timestamped today (service-local day): `GET /counts/today`.
    pub async fn today_counts(&self, token: &SecretString) -> Result<TodayCounts, Error> {
        self.get("counts/today", Some(token)).await
    }

    /// Every record the service holds, newest first: `GET /counts`.
    pub async fn list_counts(&self, token: &SecretString) -> Result<CountList, Error> {
        self.get("counts", Some(token)).await
    }

    /// Submit a detection the way a sensor does: `POST /count`.
    ///
    /// This endpoint is unauthenticated on the service side.
    pub async fn record_count(&self, count: &NewCount) -> Result<CountRecord, Error> {
        let resp: CountCreated = self.post("count", count, None).await?;
        Ok(resp.data)
    }
}
