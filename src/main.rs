//! Subscription lifecycle service
//!
//! ## Modes
//!
//! - `serve` (default) - HTTP API plus the periodic lifecycle sweep
//! - `scheduler` - Periodic lifecycle sweep only
//! - `sweep-once` - Run a single sweep, print the report and exit
//!
//! Configuration comes from `SUBSCRIPTIONS__*` environment variables. Without
//! `SUBSCRIPTIONS__DATABASE__URL` everything runs against in-memory storage.

use std::sync::Arc;

use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use subscription_lifecycle::adapters::events::{EventLogger, InMemoryEventBus, SUBSCRIPTION_EVENT_TYPES};
use subscription_lifecycle::adapters::http::{subscription_router, SubscriptionAppState};
use subscription_lifecycle::adapters::memory::{InMemoryPlanCatalog, InMemorySubscriptionStore};
use subscription_lifecycle::adapters::policy::GracePeriodPolicy;
use subscription_lifecycle::adapters::postgres::{self, PostgresPlanReader, PostgresSubscriptionRepository};
use subscription_lifecycle::adapters::clock::SystemClock;
use subscription_lifecycle::application::{EventEmitter, SweepScheduler, SweepSubscriptionsHandler};
use subscription_lifecycle::config::{AppConfig, LogFormat, StorageBackend};
use subscription_lifecycle::ports::{Clock, EventSubscriber, InvoiceLedger, PlanReader, SubscriptionRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const EVENT_HISTORY_LIMIT: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Scheduler,
    SweepOnce,
}

impl Mode {
    fn parse(arg: Option<&str>) -> Result<Self, BoxError> {
        match arg {
            None | Some("serve") => Ok(Mode::Serve),
            Some("scheduler") => Ok(Mode::Scheduler),
            Some("sweep-once") => Ok(Mode::SweepOnce),
            Some(other) => Err(format!("unknown mode '{}', expected serve, scheduler or sweep-once", other).into()),
        }
    }
}

struct Storage {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanReader>,
    invoices: Arc<dyn InvoiceLedger>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let mode = Mode::parse(std::env::args().nth(1).as_deref())?;
    tracing::info!(
        ?mode,
        environment = ?config.server.environment,
        owner_kind = %config.ownership.owner_kind,
        "Starting subscription lifecycle service"
    );

    let storage = build_storage(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let bus = Arc::new(InMemoryEventBus::new().with_history_limit(EVENT_HISTORY_LIMIT));
    bus.subscribe_all(&SUBSCRIPTION_EVENT_TYPES, Arc::new(EventLogger));
    let emitter = EventEmitter::new(bus);

    let sweep = Arc::new(SweepSubscriptionsHandler::new(
        storage.subscriptions.clone(),
        emitter.clone(),
        clock.clone(),
    ));
    let scheduler = SweepScheduler::with_config(sweep, config.lifecycle.scheduler_config());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    match mode {
        Mode::SweepOnce => {
            let report = scheduler.run_once().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Mode::Scheduler => {
            let sweeper = tokio::spawn(async move { scheduler.run(shutdown_rx).await });
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
            sweeper.await?;
        }
        Mode::Serve => {
            let sweeper = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

            let policy = Arc::new(
                GracePeriodPolicy::new(
                    storage.subscriptions.clone(),
                    storage.plans.clone(),
                    storage.invoices.clone(),
                    clock.clone(),
                )
                .with_cancel_grace_days(config.subscriptions.cancel_grace_days),
            );

            let state = SubscriptionAppState {
                subscriptions: storage.subscriptions,
                plans: storage.plans,
                invoices: storage.invoices,
                policy,
                emitter,
                clock,
                owner_kind: config.ownership.owner_kind,
                allow_multiple: config.subscriptions.allow_multiple,
                max_conflict_retries: config.subscriptions.max_conflict_retries,
            };

            let app = subscription_router()
                .with_state(state)
                .layer(TimeoutLayer::new(config.server.request_timeout()))
                .layer(TraceLayer::new_for_http());

            let addr = config.server.socket_addr()?;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "HTTP server listening");

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    let _ = shutdown_tx.send(true);
                })
                .await?;

            sweeper.await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn build_storage(config: &AppConfig) -> Result<Storage, BoxError> {
    match config.database.backend() {
        StorageBackend::Postgres => {
            let pool = postgres::connect(&config.database).await?;
            tracing::info!(url = %config.database.redacted_url(), "Using PostgreSQL storage");

            let repository = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
            Ok(Storage {
                subscriptions: repository.clone(),
                plans: Arc::new(PostgresPlanReader::new(pool)),
                invoices: repository,
            })
        }
        StorageBackend::InMemory => {
            tracing::warn!("No database configured, using in-memory storage");
            let store = Arc::new(InMemorySubscriptionStore::new());
            Ok(Storage {
                subscriptions: store.clone(),
                plans: Arc::new(InMemoryPlanCatalog::new()),
                invoices: store,
            })
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
