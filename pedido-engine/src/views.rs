//! Reactive query side
//!
//! Every aggregation is a continuously updated view over the store's current
//! contents: a `watch` channel that re-emits whenever a relevant mutation
//! lands. Recomputation is push-driven by the manager's change broadcast,
//! never polled. Per-week views are cached by week id, so an order mutation
//! recomputes only the week it touches; a settings change additionally
//! refreshes every cached dashboard, since the dashboard joins settings with
//! the week's aggregations.
//!
//! A burst of mutations is drained behind a short debounce window and
//! recomputed once at the end of the burst.
//!
//! # Event Flow
//!
//! ```text
//! PedidoManager ── broadcast(ChangeEvent) ──► change loop
//!                                                │ debounce + fold
//!                                                ▼
//!                                         recompute touched views
//!                                                │
//!                                                ▼
//!                                  watch channels (per week + global)
//! ```
//!
//! Recompute failures are logged and leave the last emitted value in place;
//! a view task never panics over a store read.

use crate::manager::ChangeEvent;
use crate::reports;
use crate::storage::{PedidoStorage, StorageResult};
use crate::week::WeekCalendar;
use parking_lot::RwLock;
use serde::Serialize;
use shared::models::{Client, ClientTotal, FlavorTotal, Order, OrderStatus, Settings, WeekSummary};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

/// Debounce window for folding a change burst into one recomputation
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// Composite per-week snapshot: settings joined with the week's aggregations
///
/// This is the one value an outer layer needs to render a whole week screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeekDashboard {
    pub week_id: String,
    pub label: String,
    pub settings: Settings,
    pub summary: WeekSummary,
    pub top_flavors: Vec<FlavorTotal>,
    pub top_clients: Vec<ClientTotal>,
}

/// Live views over the order store
///
/// Construct with the manager's storage, calendar and change subscription.
/// Must be created inside a tokio runtime: the change loop runs as a spawned
/// task and ends when the manager (the broadcast sender) is dropped.
pub struct OrderViews {
    inner: Arc<ViewsInner>,
}

impl OrderViews {
    pub fn new(
        storage: PedidoStorage,
        calendar: WeekCalendar,
        changes: broadcast::Receiver<ChangeEvent>,
    ) -> Self {
        let initial_weeks = compute_available_weeks(&storage, &calendar);
        let initial_settings = read_or_default(storage.get_settings(), "settings");
        let initial_clients = read_or_default(storage.list_clients(), "clients");

        let inner = Arc::new(ViewsInner {
            storage,
            calendar,
            week_views: RwLock::new(HashMap::new()),
            weeks_tx: watch::channel(initial_weeks).0,
            settings_tx: watch::channel(initial_settings).0,
            clients_tx: watch::channel(initial_clients).0,
        });
        tokio::spawn(run_change_loop(Arc::clone(&inner), changes));
        Self { inner }
    }

    /// Every recorded week plus the current one, newest first
    pub fn available_weeks(&self) -> watch::Receiver<Vec<String>> {
        self.inner.weeks_tx.subscribe()
    }

    /// The settings row
    pub fn settings(&self) -> watch::Receiver<Settings> {
        self.inner.settings_tx.subscribe()
    }

    /// All clients, ordered case-insensitively by name
    pub fn clients(&self) -> watch::Receiver<Vec<Client>> {
        self.inner.clients_tx.subscribe()
    }

    /// Financial summary of one week
    pub fn week_summary(&self, week_id: &str) -> watch::Receiver<WeekSummary> {
        self.inner.with_week(week_id, |ch| ch.summary_tx.subscribe())
    }

    /// Flavor ranking of one week
    pub fn top_flavors(&self, week_id: &str) -> watch::Receiver<Vec<FlavorTotal>> {
        self.inner.with_week(week_id, |ch| ch.flavors_tx.subscribe())
    }

    /// Client ranking of one week
    pub fn top_clients(&self, week_id: &str) -> watch::Receiver<Vec<ClientTotal>> {
        self.inner.with_week(week_id, |ch| ch.clients_tx.subscribe())
    }

    /// Pending orders of one week, newest first
    pub fn pending_orders(&self, week_id: &str) -> watch::Receiver<Vec<Order>> {
        self.inner.with_week(week_id, |ch| ch.pending_tx.subscribe())
    }

    /// Delivered orders of one week, newest first
    pub fn delivered_orders(&self, week_id: &str) -> watch::Receiver<Vec<Order>> {
        self.inner.with_week(week_id, |ch| ch.delivered_tx.subscribe())
    }

    /// Composite dashboard of one week
    pub fn week_dashboard(&self, week_id: &str) -> watch::Receiver<WeekDashboard> {
        self.inner.with_week(week_id, |ch| ch.dashboard_tx.subscribe())
    }
}

struct ViewsInner {
    storage: PedidoStorage,
    calendar: WeekCalendar,
    week_views: RwLock<HashMap<String, WeekChannels>>,
    weeks_tx: watch::Sender<Vec<String>>,
    settings_tx: watch::Sender<Settings>,
    clients_tx: watch::Sender<Vec<Client>>,
}

struct WeekChannels {
    summary_tx: watch::Sender<WeekSummary>,
    flavors_tx: watch::Sender<Vec<FlavorTotal>>,
    clients_tx: watch::Sender<Vec<ClientTotal>>,
    pending_tx: watch::Sender<Vec<Order>>,
    delivered_tx: watch::Sender<Vec<Order>>,
    dashboard_tx: watch::Sender<WeekDashboard>,
}

/// One full recomputation of a week's views
struct WeekComputed {
    summary: WeekSummary,
    flavors: Vec<FlavorTotal>,
    clients: Vec<ClientTotal>,
    pending: Vec<Order>,
    delivered: Vec<Order>,
    dashboard: WeekDashboard,
}

impl WeekComputed {
    fn empty(week_id: &str) -> Self {
        Self {
            summary: WeekSummary::default(),
            flavors: Vec::new(),
            clients: Vec::new(),
            pending: Vec::new(),
            delivered: Vec::new(),
            dashboard: WeekDashboard {
                week_id: week_id.to_string(),
                label: WeekCalendar::label_from_week_id(week_id),
                ..WeekDashboard::default()
            },
        }
    }
}

impl ViewsInner {
    /// Run `f` against the week's channels, building them on first access
    fn with_week<R>(&self, week_id: &str, f: impl FnOnce(&WeekChannels) -> R) -> R {
        if let Some(channels) = self.week_views.read().get(week_id) {
            return f(channels);
        }
        let mut guard = self.week_views.write();
        let channels = guard
            .entry(week_id.to_string())
            .or_insert_with(|| self.build_week_channels(week_id));
        f(channels)
    }

    fn build_week_channels(&self, week_id: &str) -> WeekChannels {
        let computed = self.compute_week(week_id).unwrap_or_else(|e| {
            tracing::error!(
                week_id = %week_id,
                error = %e,
                "Initial view computation failed, starting empty"
            );
            WeekComputed::empty(week_id)
        });
        WeekChannels {
            summary_tx: watch::channel(computed.summary).0,
            flavors_tx: watch::channel(computed.flavors).0,
            clients_tx: watch::channel(computed.clients).0,
            pending_tx: watch::channel(computed.pending).0,
            delivered_tx: watch::channel(computed.delivered).0,
            dashboard_tx: watch::channel(computed.dashboard).0,
        }
    }

    fn compute_week(&self, week_id: &str) -> StorageResult<WeekComputed> {
        let orders = self.storage.orders_by_week(week_id)?;
        let pending: Vec<Order> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .cloned()
            .collect();
        let delivered: Vec<Order> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .cloned()
            .collect();
        let summary = reports::week_summary(&orders, pending.len() as u32);
        let flavors = reports::top_flavors(&orders);
        let clients = reports::top_clients(&orders);
        let settings = self.storage.get_settings()?;
        let dashboard = WeekDashboard {
            week_id: week_id.to_string(),
            label: WeekCalendar::label_from_week_id(week_id),
            settings,
            summary: summary.clone(),
            top_flavors: flavors.clone(),
            top_clients: clients.clone(),
        };
        Ok(WeekComputed {
            summary,
            flavors,
            clients,
            pending,
            delivered,
            dashboard,
        })
    }

    fn refresh_week(&self, week_id: &str) {
        let guard = self.week_views.read();
        let Some(channels) = guard.get(week_id) else {
            // Nobody ever asked for this week; it gets built lazily later
            return;
        };
        match self.compute_week(week_id) {
            Ok(computed) => {
                channels.summary_tx.send_replace(computed.summary);
                channels.flavors_tx.send_replace(computed.flavors);
                channels.clients_tx.send_replace(computed.clients);
                channels.pending_tx.send_replace(computed.pending);
                channels.delivered_tx.send_replace(computed.delivered);
                channels.dashboard_tx.send_replace(computed.dashboard);
            }
            Err(e) => {
                tracing::error!(
                    week_id = %week_id,
                    error = %e,
                    "View recompute failed, keeping last value"
                );
            }
        }
    }

    fn apply(&self, batch: &ChangeBatch) {
        if batch.settings || batch.all {
            match self.storage.get_settings() {
                Ok(settings) => {
                    self.settings_tx.send_replace(settings);
                }
                Err(e) => tracing::error!(error = %e, "Settings view recompute failed"),
            }
        }
        if batch.clients || batch.all {
            match self.storage.list_clients() {
                Ok(clients) => {
                    self.clients_tx.send_replace(clients);
                }
                Err(e) => tracing::error!(error = %e, "Clients view recompute failed"),
            }
        }
        if !batch.weeks.is_empty() || batch.all {
            self.weeks_tx
                .send_replace(compute_available_weeks(&self.storage, &self.calendar));
        }

        // Order changes recompute their own week; settings changes feed into
        // every cached dashboard.
        let cached: Vec<String> = self.week_views.read().keys().cloned().collect();
        for week_id in cached {
            if batch.all || batch.settings || batch.weeks.contains(&week_id) {
                self.refresh_week(&week_id);
            }
        }
    }
}

/// Accumulated change burst
#[derive(Debug, Default)]
struct ChangeBatch {
    weeks: BTreeSet<String>,
    clients: bool,
    settings: bool,
    all: bool,
}

impl ChangeBatch {
    fn everything() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    fn add(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Orders { week_id } => {
                self.weeks.insert(week_id);
            }
            ChangeEvent::Clients => self.clients = true,
            ChangeEvent::Settings => self.settings = true,
        }
    }
}

async fn run_change_loop(inner: Arc<ViewsInner>, mut changes: broadcast::Receiver<ChangeEvent>) {
    loop {
        let first = match changes.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Change stream lagged, recomputing every view");
                inner.apply(&ChangeBatch::everything());
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let mut batch = ChangeBatch::default();
        batch.add(first);

        // Drain the burst: keep folding events until the stream stays quiet
        // for a debounce window, then recompute once.
        loop {
            match tokio::time::timeout(DEBOUNCE_WINDOW, changes.recv()).await {
                Ok(Ok(event)) => batch.add(event),
                Ok(Err(RecvError::Lagged(_))) => batch.all = true,
                Ok(Err(RecvError::Closed)) => {
                    inner.apply(&batch);
                    return;
                }
                Err(_) => break,
            }
        }
        inner.apply(&batch);
    }
}

fn compute_available_weeks(storage: &PedidoStorage, calendar: &WeekCalendar) -> Vec<String> {
    let current = calendar.current_week_range().week_id;
    match storage.distinct_week_ids() {
        Ok(recorded) => reports::available_weeks(&recorded, &current),
        Err(e) => {
            tracing::error!(error = %e, "Week list read failed, falling back to current week");
            vec![current]
        }
    }
}

fn read_or_default<T: Default>(result: StorageResult<T>, what: &'static str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, what, "View read failed, using default");
            T::default()
        }
    }
}
