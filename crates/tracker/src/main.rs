use std::sync::Arc;

use homepro_core::booking::{InMemoryBookings, ProviderProfile, TrackingSeed};
use homepro_core::clock::SystemClock;
use homepro_core::geo::{DEFAULT_DESTINATION, DEFAULT_START_OFFSET};
use homepro_core::intro::{IntroGate, IntroOutcome};
use homepro_core::presentation::{booking_reference, format_naira, TrackingView};
use homepro_events::TrackingBus;
use homepro_tracker::config::TrackerConfig;
use homepro_tracker::controller::{ReviewChannel, TrackingController};
use homepro_tracker::error::TrackerResult;
use homepro_tracker::store::JsonFileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// One session, one driver: a current-thread runtime keeps ticks and
// customer actions strictly interleaved.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homepro_tracker=debug,homepro_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Tracking simulation failed");
        std::process::exit(1);
    }
}

async fn run() -> TrackerResult<()> {
    let config = TrackerConfig::from_env()?;
    tracing::info!(
        tick_ms = config.tick_interval.as_millis() as u64,
        completes_after_secs = config.simulation.timeline.completion_delay().as_secs(),
        "Configuration loaded"
    );

    let store = JsonFileStore::new(&config.state_file);
    let mut intro = IntroGate::load(&store)?;
    tracing::debug!(path = %store.path().display(), "Intro state loaded");
    if intro.should_show_intro() {
        tracing::info!("HomePro Connect: Trusted. Skilled. Reliable.");
        intro.mark_seen(&store, IntroOutcome::Completed)?;
    }

    // A single confirmed booking stands in for the remote data store.
    let bookings = InMemoryBookings::new();
    let job_id = uuid::Uuid::now_v7();
    bookings.insert(
        job_id,
        TrackingSeed {
            provider: ProviderProfile::new("Adaeze Okafor").with_eta("12 min"),
            destination: DEFAULT_DESTINATION,
            start_offset: DEFAULT_START_OFFSET,
            service_name: "Hair Styling".to_string(),
            price: Some(15_000),
        },
    );

    let bus = TrackingBus::default();
    let mut notifications = bus.subscribe();
    let (review, mut review_requests) = ReviewChannel::new();

    let controller = TrackingController::start(
        job_id,
        &bookings,
        &config,
        Arc::new(SystemClock),
        &bus,
        Arc::new(review),
    )
    .await?;

    let seed = controller.seed().clone();
    let category = seed.service_category();
    if !category.is_recognized() {
        tracing::warn!(service = %seed.service_name, "Unrecognized service, using fallback icon");
    }
    tracing::info!(
        booking = %booking_reference(Some(job_id)),
        service = %format!("{} {}", category.icon(), category.display_name()),
        total = %seed.price.map(format_naira).unwrap_or_else(|| format_naira(0)),
        "Tracking booking"
    );
    render(&controller.view());

    let mut updates = controller.watch();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                render(&TrackingView::build(&state, &seed.provider));
                tracing::debug!(booking_status = controller.booking_status().as_str(), "Booking status to persist");
            }
            notification = notifications.recv() => match notification {
                Ok(n) => {
                    let json = serde_json::to_string(&n).unwrap_or_default();
                    tracing::debug!(notification = %json, "Notification");
                    if n.is_completed() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Notification stream interrupted");
                    break;
                }
            },
        }
    }

    if let Some(request) = review_requests.recv().await {
        tracing::info!(
            job_id = %request.job_id,
            provider = %request.provider.name,
            "Review screen opened: rate your experience"
        );
    }

    controller.finished().await;
    Ok(())
}

fn render(view: &TrackingView) {
    tracing::info!(
        title = view.title,
        subtitle = %view.subtitle,
        progress = %format!("{:.0}%", view.progress * 100.0),
        eta = view.eta_badge.as_deref().unwrap_or("-"),
        lat = view.provider_marker.lat,
        lng = view.provider_marker.lng,
        "Tracking view"
    );
}
