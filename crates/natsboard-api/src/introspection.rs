// Cluster-introspection endpoints.
//
// The six read operations the resource-tree engine consumes, kept in
// their own file so `client.rs` stays focused on transport mechanics.
// Paths and query parameters match control-plane API v1.

use crate::client::ControlPlaneClient;
use crate::error::Error;
use crate::types::{
    AccountSummary, ClusterSummary, ConsumersResponse, DetectionResponse, StreamDetail,
};

impl ControlPlaneClient {
    /// Fetch metadata for one cluster.
    pub async fn get_cluster(&self, cluster_id: &str) -> Result<ClusterSummary, Error> {
        self.get(&format!("clusters/{cluster_id}")).await
    }

    /// List account summaries for a cluster. `page_size` caps the result.
    pub async fn list_accounts(
        &self,
        cluster_id: &str,
        page_size: u32,
    ) -> Result<Vec<AccountSummary>, Error> {
        self.get_with_params(
            &format!("clusters/{cluster_id}/accounts"),
            &[("page_size", page_size.to_string())],
        )
        .await
    }

    /// Cheap JetStream usage probe for one account, keyed by the account
    /// public key. The engine uses only `streams > 0` from the result.
    pub async fn jetstream_detection(
        &self,
        cluster_id: &str,
        account_public_key: &str,
        page_size: u32,
    ) -> Result<DetectionResponse, Error> {
        self.get_with_params(
            &format!("clusters/{cluster_id}/jetstream/detection"),
            &[
                ("acc", account_public_key.to_owned()),
                ("page_size", page_size.to_string()),
            ],
        )
        .await
    }

    /// Authoritative stream-name listing for one account.
    pub async fn jetstream_stream_names(
        &self,
        cluster_id: &str,
        account_id: &str,
        page_size: u32,
    ) -> Result<Vec<String>, Error> {
        self.get_with_params(
            &format!("clusters/{cluster_id}/jetstream/actuality"),
            &[
                ("account_id", account_id.to_owned()),
                ("page_size", page_size.to_string()),
            ],
        )
        .await
    }

    /// Full config/state detail for one stream.
    pub async fn jetstream_stream_detail(
        &self,
        cluster_id: &str,
        account_id: &str,
        stream: &str,
    ) -> Result<StreamDetail, Error> {
        self.get_with_params(
            &format!("clusters/{cluster_id}/jetstream/info"),
            &[
                ("account_id", account_id.to_owned()),
                ("stream", stream.to_owned()),
            ],
        )
        .await
    }

    /// Consumer names attached to one stream.
    pub async fn jetstream_consumers(
        &self,
        cluster_id: &str,
        stream: &str,
    ) -> Result<ConsumersResponse, Error> {
        self.get(&format!("clusters/{cluster_id}/jetstream/{stream}/consumers"))
            .await
    }
}
