use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiError, BackendClient};
use crate::domain::{
    AnalyticsRange, MaintenanceRequest, NewTable, Table, TableFilter, TableId, TableStatusUpdate,
    TableUpdate,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTableRequest<'a> {
    pub table_ids: &'a [TableId],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<&'a TableUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "modifiedCount", alias = "deletedCount")]
    pub affected: Option<u64>,
}

impl BackendClient {
    #[tracing::instrument("Listing tables", skip(self))]
    pub async fn list_tables(&self, filter: &TableFilter) -> Result<Vec<Table>, ApiError> {
        let request = self.request(Method::GET, "/tables").query(filter);
        self.execute(request).await
    }

    #[tracing::instrument("Fetching table", skip(self))]
    pub async fn get_table_by_id(&self, table_id: &TableId) -> Result<Table, ApiError> {
        let request = self.request(Method::GET, &format!("/tables/{}", table_id));
        self.execute(request).await
    }

    #[tracing::instrument("Creating table", skip(self))]
    pub async fn create_table(&self, table: &NewTable) -> Result<Table, ApiError> {
        let request = self.request(Method::POST, "/tables").json(table);
        self.execute(request).await
    }

    #[tracing::instrument("Updating table", skip(self))]
    pub async fn update_table(&self, table_id: &TableId, update: &TableUpdate) -> Result<Table, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/tables/{}", table_id))
            .json(update);
        self.execute(request).await
    }

    /// Status change on a single table.
    ///
    /// The backend answers `409 TABLE_NOT_AVAILABLE` when the table's status
    /// moved on since the caller last read it.
    #[tracing::instrument("Updating table status", skip(self), fields(status = %update.status))]
    pub async fn update_table_status(
        &self,
        table_id: &TableId,
        update: &TableStatusUpdate,
    ) -> Result<Table, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/tables/{}", table_id))
            .json(update);
        self.execute(request).await
    }

    #[tracing::instrument("Deleting table", skip(self))]
    pub async fn delete_table(&self, table_id: &TableId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/tables/{}", table_id));
        self.execute_discarding_body(request).await
    }

    #[tracing::instrument("Bulk updating tables", skip(self, update), fields(count = table_ids.len()))]
    pub async fn bulk_update_tables(
        &self,
        table_ids: &[TableId],
        update: &TableUpdate,
    ) -> Result<BulkOperationResult, ApiError> {
        let body = BulkTableRequest { table_ids, updates: Some(update) };
        let request = self.request(Method::PUT, "/tables/bulk").json(&body);
        self.execute(request).await
    }

    #[tracing::instrument("Bulk deleting tables", skip(self), fields(count = table_ids.len()))]
    pub async fn bulk_delete_tables(&self, table_ids: &[TableId]) -> Result<BulkOperationResult, ApiError> {
        let body = BulkTableRequest { table_ids, updates: None };
        let request = self.request(Method::DELETE, "/tables/bulk").json(&body);
        self.execute(request).await
    }

    // Analytics payloads are server-defined and only ever displayed
    #[tracing::instrument("Fetching table analytics", skip(self))]
    pub async fn get_table_analytics(&self, range: &AnalyticsRange) -> Result<serde_json::Value, ApiError> {
        let request = self.request(Method::GET, "/tables/analytics").query(range);
        self.execute(request).await
    }

    #[tracing::instrument("Fetching table statistics", skip(self))]
    pub async fn get_table_statistics(&self) -> Result<serde_json::Value, ApiError> {
        let request = self.request(Method::GET, "/tables/statistics");
        self.execute(request).await
    }

    #[tracing::instrument("Fetching table utilization", skip(self))]
    pub async fn get_table_utilization(&self) -> Result<serde_json::Value, ApiError> {
        let request = self.request(Method::GET, "/tables/utilization");
        self.execute(request).await
    }

    #[tracing::instrument("Fetching tables requiring maintenance", skip(self))]
    pub async fn get_maintenance_required(&self) -> Result<Vec<Table>, ApiError> {
        let request = self.request(Method::GET, "/tables/maintenance/required");
        self.execute(request).await
    }

    #[tracing::instrument("Scheduling table maintenance", skip(self))]
    pub async fn schedule_maintenance(
        &self,
        table_id: &TableId,
        maintenance: &MaintenanceRequest,
    ) -> Result<Table, ApiError> {
        let request = self
            .request(Method::POST, &format!("/tables/{}/maintenance", table_id))
            .json(maintenance);
        self.execute(request).await
    }
}
