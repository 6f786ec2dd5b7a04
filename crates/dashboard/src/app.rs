use std::{future::Future, sync::Arc};

use checkpointz_cache::{QueryClient, QueryKey, QueryOptions, QueryState, Subscription};
use checkpointz_rpc::CheckpointzClient;
use checkpointz_types::{
    primitives::Slot,
    slot::{BeaconSlot, SlotDetail},
    status::Status,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    boundary::ErrorBoundary,
    config::DashboardConfig,
    filter::TableSearch,
    get_started::{ConsensusClient, GetStarted},
    render::{Component, RenderContext},
    utils::latest_finalized_epoch,
    views::{
        CheckpointsTable, Footer, GraffitiFormat, Header, Hero, QueryView, SlotView, UpstreamTable,
    },
};

pub const STATUS_SCOPE: &str = "status";
pub const BEACON_SLOTS_SCOPE: &str = "beacon_slots";
pub const BEACON_SLOT_SCOPE: &str = "beacon_slot";

pub fn status_key() -> QueryKey {
    QueryKey::new(STATUS_SCOPE)
}

pub fn beacon_slots_key() -> QueryKey {
    QueryKey::new(BEACON_SLOTS_SCOPE)
}

pub fn beacon_slot_key(slot: Slot) -> QueryKey {
    QueryKey::new(BEACON_SLOT_SCOPE).with_param("slot", slot)
}

/// Where the dashboard gets its data from.
pub trait DataSource: Send + Sync + 'static {
    fn status(&self) -> impl Future<Output = anyhow::Result<Status>> + Send;

    fn beacon_slots(&self) -> impl Future<Output = anyhow::Result<Vec<BeaconSlot>>> + Send;

    fn beacon_slot(&self, slot: Slot) -> impl Future<Output = anyhow::Result<SlotDetail>> + Send;
}

impl DataSource for CheckpointzClient {
    async fn status(&self) -> anyhow::Result<Status> {
        Ok(CheckpointzClient::status(self).await?)
    }

    async fn beacon_slots(&self) -> anyhow::Result<Vec<BeaconSlot>> {
        Ok(CheckpointzClient::beacon_slots(self).await?)
    }

    async fn beacon_slot(&self, slot: Slot) -> anyhow::Result<SlotDetail> {
        Ok(CheckpointzClient::beacon_slot(self, slot).await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    Status,
    BeaconSlots,
    BeaconSlot(Slot),
}

/// A query has an answer, good or bad, and nothing is in flight for it.
pub fn is_settled<T>(state: &QueryState<T>) -> bool {
    !state.is_loading() && !state.is_fetching
}

pub struct Dashboard<S> {
    queries: QueryClient,
    source: Arc<S>,
    config: DashboardConfig,
    events: mpsc::UnboundedSender<DashboardEvent>,
    status: Subscription<Status>,
    beacon_slots: Subscription<Vec<BeaconSlot>>,
    slot: Option<(Slot, Subscription<SlotDetail>)>,
    pub upstream_search: TableSearch,
    pub slot_search: TableSearch,
}

impl<S: DataSource> Dashboard<S> {
    /// Subscribes to the status and historical slots, polling both at the
    /// configured interval. Every change to a subscribed query is reported on
    /// the returned channel.
    pub fn new(
        queries: QueryClient,
        source: S,
        config: DashboardConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let source = Arc::new(source);
        let options = QueryOptions::polling(config.poll_interval());

        let status = {
            let source = source.clone();
            queries.subscribe(
                status_key(),
                move || {
                    let source = source.clone();
                    async move { source.status().await }
                },
                options,
                notifier(&events, DashboardEvent::Status),
            )
        };
        let beacon_slots = {
            let source = source.clone();
            queries.subscribe(
                beacon_slots_key(),
                move || {
                    let source = source.clone();
                    async move { source.beacon_slots().await }
                },
                options,
                notifier(&events, DashboardEvent::BeaconSlots),
            )
        };
        info!(interval = ?config.poll_interval(), "dashboard subscribed");

        (
            Self {
                queries,
                source,
                config,
                events,
                status,
                beacon_slots,
                slot: None,
                upstream_search: TableSearch::default(),
                slot_search: TableSearch::default(),
            },
            rx,
        )
    }

    /// Shows one slot. Replaces whichever slot was open before.
    pub fn open_slot(&mut self, slot: Slot) {
        if self.slot.as_ref().is_some_and(|(open, _)| *open == slot) {
            return;
        }
        debug!(slot, "opening slot");
        let source = self.source.clone();
        let subscription = self.queries.subscribe(
            beacon_slot_key(slot),
            move || {
                let source = source.clone();
                async move { source.beacon_slot(slot).await }
            },
            QueryOptions::once(),
            notifier(&self.events, DashboardEvent::BeaconSlot(slot)),
        );
        self.slot = Some((slot, subscription));
    }

    pub fn close_slot(&mut self) {
        self.slot = None;
    }

    /// Forces a refresh of every open query.
    pub fn refresh(&self) {
        self.status.refetch();
        self.beacon_slots.refetch();
        if let Some((_, slot)) = &self.slot {
            slot.refetch();
        }
    }

    pub fn status(&self) -> QueryState<Status> {
        self.status.state()
    }

    pub fn beacon_slots(&self) -> QueryState<Vec<BeaconSlot>> {
        self.beacon_slots.state()
    }

    pub fn slot(&self) -> Option<QueryState<SlotDetail>> {
        self.slot.as_ref().map(|(_, subscription)| subscription.state())
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Waits on `events` until `ready` holds.
    pub async fn wait_until<F>(&self, events: &mut mpsc::UnboundedReceiver<DashboardEvent>, ready: F)
    where
        F: Fn(&Self) -> bool,
    {
        while !ready(self) {
            if events.recv().await.is_none() {
                return;
            }
        }
    }

    pub fn render_status(&self, ctx: &RenderContext) -> String {
        let state = self.status();
        let status = state.data();
        [
            self.guarded(&Header::new(status, state.is_loading()), ctx),
            self.guarded(&Hero::new(status), ctx),
            self.guarded(&Footer::new(status), ctx),
        ]
        .join("\n")
    }

    pub fn render_upstreams(&self, ctx: &RenderContext) -> String {
        let state = self.status();
        self.guarded(
            &QueryView::new("upstreams", &state, |status: &Status, ctx: &RenderContext| {
                UpstreamTable::new(status, &self.upstream_search).render(ctx)
            }),
            ctx,
        )
    }

    pub fn render_checkpoints(&self, ctx: &RenderContext) -> String {
        let latest = self.status().data().and_then(latest_finalized_epoch);
        let state = self.beacon_slots();
        self.guarded(
            &QueryView::new(
                "checkpoints",
                &state,
                |slots: &Vec<BeaconSlot>, ctx: &RenderContext| {
                    CheckpointsTable::new(slots, latest, &self.slot_search).render(ctx)
                },
            ),
            ctx,
        )
    }

    /// The open slot, or `None` if no slot was opened.
    pub fn render_slot(&self, ctx: &RenderContext, graffiti: GraffitiFormat) -> Option<String> {
        let state = self.slot()?;
        Some(self.guarded(
            &QueryView::new("slot", &state, |detail: &SlotDetail, ctx: &RenderContext| {
                SlotView::new(detail, graffiti).render(ctx)
            }),
            ctx,
        ))
    }

    /// Header, checkpoint cards, both tables and the footer.
    pub fn render(&self, ctx: &RenderContext) -> String {
        let state = self.status();
        let status = state.data();
        [
            self.guarded(&Header::new(status, state.is_loading()), ctx),
            self.guarded(&Hero::new(status), ctx),
            self.render_upstreams(ctx),
            self.render_checkpoints(ctx),
            self.guarded(&Footer::new(status), ctx),
        ]
        .join("\n")
    }

    pub fn render_get_started(
        &self,
        ctx: &RenderContext,
        client: Option<&ConsensusClient>,
    ) -> String {
        let state = self.status();
        let public_url = self
            .config
            .public_url(state.data().and_then(|status| status.public_url.as_deref()));
        self.guarded(&GetStarted::new(client, public_url), ctx)
    }

    fn guarded(&self, component: &dyn Component, ctx: &RenderContext) -> String {
        ErrorBoundary.render(component, ctx)
    }
}

fn notifier(
    events: &mpsc::UnboundedSender<DashboardEvent>,
    event: DashboardEvent,
) -> impl Fn() + Send + Sync + 'static {
    let events = events.clone();
    move || {
        // the receiver is gone once the dashboard shuts down
        let _ = events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use anyhow::anyhow;
    use checkpointz_types::{
        block::{BlockBody, BlockMessage, ForkName, SignedBlock, VersionedBlock},
        checkpoint::{Checkpoint, Finality},
        upstream::Upstream,
    };
    use chrono::{TimeZone, Utc};
    use tokio::runtime::Handle;

    use super::*;
    use crate::get_started::find_client;

    #[derive(Default)]
    struct FakeSource {
        status_calls: AtomicUsize,
        fail: bool,
    }

    impl DataSource for FakeSource {
        async fn status(&self) -> anyhow::Result<Status> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(Status {
                upstreams: [(
                    "lighthouse".to_string(),
                    Upstream {
                        name: "lighthouse".to_string(),
                        healthy: true,
                        network_name: Some("mainnet".to_string()),
                        finality: None,
                    },
                )]
                .into_iter()
                .collect(),
                finality: Some(Finality {
                    finalized: Some(Checkpoint {
                        epoch: 16532,
                        root: "0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92"
                            .to_string(),
                    }),
                    ..Default::default()
                }),
                public_url: Some("https://sync.example.org".to_string()),
                ..Default::default()
            })
        }

        async fn beacon_slots(&self) -> anyhow::Result<Vec<BeaconSlot>> {
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(vec![BeaconSlot {
                slot: 529024,
                block_root: None,
                state_root: None,
                epoch: Some(16532),
                time: None,
            }])
        }

        async fn beacon_slot(&self, slot: Slot) -> anyhow::Result<SlotDetail> {
            Ok(SlotDetail {
                block: Some(VersionedBlock::new(
                    ForkName::Capella,
                    SignedBlock {
                        message: BlockMessage {
                            slot,
                            proposer_index: 1466,
                            parent_root: "0x0b019674".to_string(),
                            state_root: "0x854ca984".to_string(),
                            body: BlockBody {
                                randao_reveal: "0x00".to_string(),
                                eth1_data: None,
                                execution_payload: None,
                                graffiti: "0x".to_string(),
                            },
                        },
                        signature: "0x00".to_string(),
                    },
                )),
                epoch: Some(slot / 32),
                time: None,
            })
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::plain_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn dashboard(
        source: FakeSource,
    ) -> (Dashboard<FakeSource>, mpsc::UnboundedReceiver<DashboardEvent>) {
        Dashboard::new(
            QueryClient::new(Handle::current()),
            source,
            DashboardConfig::default(),
        )
    }

    fn both_settled(dashboard: &Dashboard<FakeSource>) -> bool {
        is_settled(&dashboard.status()) && is_settled(&dashboard.beacon_slots())
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_then_data() {
        let (dashboard, mut events) = dashboard(FakeSource::default());

        assert!(dashboard.render_upstreams(&ctx()).contains("Loading..."));

        dashboard.wait_until(&mut events, both_settled).await;
        let out = dashboard.render(&ctx());

        assert!(out.contains("Network: mainnet"));
        assert!(out.contains("16532"));
        assert!(out.contains("lighthouse  Healthy"));
        assert!(out.contains("16532 ⚑"));
        assert!(out.contains("powered by Checkpointz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_renders_notice() {
        let (dashboard, mut events) = dashboard(FakeSource {
            fail: true,
            ..Default::default()
        });

        dashboard.wait_until(&mut events, both_settled).await;

        assert!(dashboard.render_upstreams(&ctx()).contains("Something went wrong"));
        assert!(dashboard.render_checkpoints(&ctx()).contains("Something went wrong"));
        assert!(dashboard.render_status(&ctx()).contains("0x000000...000000"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_at_configured_interval() {
        let (dashboard, mut events) = dashboard(FakeSource::default());
        dashboard.wait_until(&mut events, both_settled).await;
        assert_eq!(dashboard.source.status_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        dashboard.wait_until(&mut events, both_settled).await;

        assert_eq!(dashboard.source.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_slot() {
        let (mut dashboard, mut events) = dashboard(FakeSource::default());
        assert!(dashboard.render_slot(&ctx(), GraffitiFormat::Ascii).is_none());

        dashboard.open_slot(529024);
        dashboard
            .wait_until(&mut events, |d| d.slot().is_some_and(|s| is_settled(&s)))
            .await;
        let out = dashboard
            .render_slot(&ctx(), GraffitiFormat::Ascii)
            .unwrap();

        assert!(out.starts_with("Slot 529024 (CAPELLA)"));
        assert!(dashboard.queries.subscriber_count(&beacon_slot_key(529024)) == 1);

        dashboard.close_slot();
        assert_eq!(dashboard.queries.subscriber_count(&beacon_slot_key(529024)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_searches_filter_tables() {
        let (mut dashboard, mut events) = dashboard(FakeSource::default());
        dashboard.wait_until(&mut events, both_settled).await;

        dashboard.upstream_search.set("teku");
        dashboard.slot_search.set("529024");

        assert!(dashboard.render_upstreams(&ctx()).contains("No upstreams found"));
        assert!(dashboard.render_checkpoints(&ctx()).contains("529024"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_started_uses_status_public_url() {
        let (dashboard, mut events) = dashboard(FakeSource::default());
        dashboard.wait_until(&mut events, both_settled).await;

        let out = dashboard.render_get_started(&ctx(), find_client("lighthouse"));

        assert!(out.contains("--checkpoint-sync-url=https://sync.example.org"));
    }
}
