use std::sync::Arc;

use anyhow::Context;

use crate::{
    api_client::BackendClient,
    assignment::{AssignmentEngine, AssignmentOutcome, DisplayInfo},
    configuration::Settings,
    domain::{ReservationFilter, ReservationId, TableFilter, TableId},
    floor_view::FloorView,
    live::{LiveChannel, LiveSync},
    notifier::Notifier,
};

// Wires the backend client, floor view, assignment engine and live channel together
pub struct Dashboard{
    client: BackendClient,
    engine: AssignmentEngine,
    live: LiveChannel,
    notifier: Arc<dyn Notifier>,
    view: FloorView
}

impl Dashboard {
    pub fn build(settings: &Settings, notifier: Arc<dyn Notifier>) -> Result<Self, anyhow::Error>{
        let client = BackendClient::from_settings(&settings.backend)
            .context("Failed to build backend client")?;
        let engine = AssignmentEngine::new(client.clone(), notifier.clone(), settings.workflow.compensation);

        tracing::info!(
            base_url = client.base_url(),
            compensation = ?settings.workflow.compensation,
            "Dashboard ready"
        );

        Ok(Dashboard{
            client,
            engine,
            live: LiveChannel::new(settings.live.buffer),
            notifier,
            view: FloorView::default()
        })
    }

    // Swaps the view's filters; the cached contents are dropped until the next refresh
    pub fn with_filters(mut self, tables: TableFilter, reservations: ReservationFilter) -> Self {
        self.view = FloorView::new(tables, reservations);
        self
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn view(&self) -> &FloorView {
        &self.view
    }

    // Transports publish decoded push frames here
    pub fn live_channel(&self) -> &LiveChannel {
        &self.live
    }

    pub async fn refresh(&mut self) -> Result<(), anyhow::Error>{
        self.view
            .refresh(&self.client)
            .await
            .context("Failed to load tables and reservations")
    }

    pub async fn assign(
        &mut self,
        reservation_id: &ReservationId,
        table_id: &TableId,
        display: &DisplayInfo
    ) -> AssignmentOutcome {
        self.engine
            .assign_reservation_to_table(&mut self.view, reservation_id, table_id, display)
            .await
    }

    pub fn attach_live(&self) -> LiveSync {
        LiveSync::attach(&self.live, self.client.clone(), self.notifier.clone())
    }

    // Applies whatever live events are queued for this dashboard's view
    pub async fn apply_live(&mut self, sync: &mut LiveSync) -> usize {
        sync.drain(&mut self.view).await
    }
}
