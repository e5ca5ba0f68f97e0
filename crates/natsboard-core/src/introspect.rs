// ── Cluster-introspection seam ──
//
// The engine consumes the control plane through this trait rather than
// the concrete client, so tests can drive it with a scripted mock. The
// five read operations fail independently of each other; the engine
// never assumes ordering between them.

use natsboard_api::{
    AccountSummary, ClusterSummary, ControlPlaneClient, DetectionResponse, Error as ApiError,
    StreamDetail,
};

/// Read-side introspection over one cluster's messaging namespace.
#[allow(async_fn_in_trait)]
pub trait Introspect {
    /// Metadata for the cluster itself (name, status).
    async fn cluster_metadata(&self, cluster_id: &str) -> Result<ClusterSummary, ApiError>;

    /// All account summaries, including system accounts (the store
    /// filters those out).
    async fn list_accounts(
        &self,
        cluster_id: &str,
        page_size: u32,
    ) -> Result<Vec<AccountSummary>, ApiError>;

    /// Cheap expandability probe; only `streams > 0` is load-bearing.
    async fn probe_account(
        &self,
        cluster_id: &str,
        account_public_key: &str,
        page_size: u32,
    ) -> Result<DetectionResponse, ApiError>;

    /// Authoritative stream-name listing for one account.
    async fn list_stream_names(
        &self,
        cluster_id: &str,
        account_id: &str,
        page_size: u32,
    ) -> Result<Vec<String>, ApiError>;

    /// Full config/state detail for one stream.
    async fn stream_detail(
        &self,
        cluster_id: &str,
        account_id: &str,
        stream: &str,
    ) -> Result<StreamDetail, ApiError>;

    /// Consumer names attached to one stream.
    async fn list_consumers(&self, cluster_id: &str, stream: &str)
    -> Result<Vec<String>, ApiError>;
}

impl Introspect for ControlPlaneClient {
    async fn cluster_metadata(&self, cluster_id: &str) -> Result<ClusterSummary, ApiError> {
        self.get_cluster(cluster_id).await
    }

    async fn list_accounts(
        &self,
        cluster_id: &str,
        page_size: u32,
    ) -> Result<Vec<AccountSummary>, ApiError> {
        ControlPlaneClient::list_accounts(self, cluster_id, page_size).await
    }

    async fn probe_account(
        &self,
        cluster_id: &str,
        account_public_key: &str,
        page_size: u32,
    ) -> Result<DetectionResponse, ApiError> {
        self.jetstream_detection(cluster_id, account_public_key, page_size)
            .await
    }

    async fn list_stream_names(
        &self,
        cluster_id: &str,
        account_id: &str,
        page_size: u32,
    ) -> Result<Vec<String>, ApiError> {
        self.jetstream_stream_names(cluster_id, account_id, page_size)
            .await
    }

    async fn stream_detail(
        &self,
        cluster_id: &str,
        account_id: &str,
        stream: &str,
    ) -> Result<StreamDetail, ApiError> {
        self.jetstream_stream_detail(cluster_id, account_id, stream)
            .await
    }

    async fn list_consumers(
        &self,
        cluster_id: &str,
        stream: &str,
    ) -> Result<Vec<String>, ApiError> {
        Ok(self.jetstream_consumers(cluster_id, stream).await?.consumers)
    }
}
