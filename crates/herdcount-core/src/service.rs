// ── Service seam ──
//
// The session only needs five calls from the counting service. Keeping
// them behind a trait lets the state machine run against an in-memory
// service under a paused clock.

use std::future::Future;

use herdcount_api::{
    ApiClient, CountStats, Credentials, DeviceList, Error, LoginGrant, TodayCounts,
};
use secrecy::SecretString;

/// Calls the session makes against the counting service.
pub trait CountingService: Send + Sync + 'static {
    /// Create an account. Returns the service's confirmation text, if any.
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Exchange credentials for a bearer token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginGrant, Error>> + Send;

    fn count_stats(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<CountStats, Error>> + Send;

    fn today_counts(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<TodayCounts, Error>> + Send;

    fn list_devices(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<DeviceList, Error>> + Send;
}

impl CountingService for ApiClient {
    async fn register(&self, credentials: &Credentials) -> Result<Option<String>, Error> {
        ApiClient::register(self, credentials).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, Error> {
        ApiClient::login(self, credentials).await
    }

    async fn count_stats(&self, token: &SecretString) -> Result<CountStats, Error> {
        ApiClient::count_stats(self, token).await
    }

    async fn today_counts(&self, token: &SecretString) -> Result<TodayCounts, Error> {
        ApiClient::today_counts(self, token).await
    }

    async fn list_devices(&self, token: &SecretString) -> Result<DeviceList, Error> {
        ApiClient::list_devices(self, token).await
    }
}
