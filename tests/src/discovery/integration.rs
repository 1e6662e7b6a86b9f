use std::sync::Arc;
use std::time::Duration;

use flock_backend::SimulatedBackend;
use flock_common::config::Config;
use flock_core::{DiscoverySession, SessionError, SessionState};

use crate::support::{self, RecordingObserver, ScriptedBackend};

#[tokio::test(start_paused = true)]
async fn default_scan_reports_devices_in_order() -> anyhow::Result<()> {
    let calls = support::journal();
    let seen = support::journal();
    let backend = Arc::new(
        ScriptedBackend::new(&calls)
            .with_device("Printer", "192.168.1.5", "631")
            .with_device("NAS", "192.168.1.9", "445"),
    );
    let (session, mut events) = DiscoverySession::new(backend.clone(), &Config::default());
    let mut observer = RecordingObserver::new(&seen);

    let found = support::scan(&session, &mut events, &mut observer).await?;

    assert_eq!(found, 2);
    assert_eq!(
        support::entries(&seen),
        [
            "busy(true)",
            "status(starting discovery)",
            "status(discovering for 5s)",
            "devices([Printer@192.168.1.5:631, NAS@192.168.1.9:445])",
            "status(found 2 device(s))",
            "busy(false)",
        ]
    );
    assert_eq!(
        support::entries(&calls),
        ["start_scan(default)", "collect_count(5000ms)", "stop_scan"]
    );
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!observer.model.is_busy());
    assert_eq!(observer.model.status(), "found 2 device(s)");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn configured_service_type_reaches_backend() -> anyhow::Result<()> {
    let calls = support::journal();
    let backend = Arc::new(ScriptedBackend::new(&calls));
    let cfg = Config {
        service_type: Some("_ipp._tcp.local.".into()),
        ..Config::default()
    };
    let (session, mut events) = DiscoverySession::new(backend, &cfg);
    let mut observer = RecordingObserver::new(&support::journal());

    let found = support::scan(&session, &mut events, &mut observer).await?;

    assert_eq!(found, 0);
    assert_eq!(support::entries(&calls)[0], "start_scan(_ipp._tcp.local.)");
    assert_eq!(observer.model.status(), "found 0 device(s)");
    Ok(())
}

#[tokio::test]
async fn simulated_network_skips_unresolved_service() -> anyhow::Result<()> {
    let backend = Arc::new(SimulatedBackend::demo());
    let (session, mut events) =
        DiscoverySession::new(backend.clone(), &support::config(Duration::from_millis(10)));
    let mut observer = RecordingObserver::new(&support::journal());

    let found = support::scan(&session, &mut events, &mut observer).await?;

    let names: Vec<&str> = observer.model.devices().iter().map(|d| d.name()).collect();
    assert_eq!(found, 3);
    assert_eq!(names, ["Printer", "NAS", "Office Speaker"]);
    assert!(!backend.is_scanning());
    Ok(())
}

#[tokio::test]
async fn failed_scan_keeps_previous_results() {
    let seen = support::journal();
    let backend = Arc::new(
        ScriptedBackend::new(&support::journal())
            .with_device("Printer", "192.168.1.5", "631")
            .with_device("NAS", "192.168.1.9", "445")
            .reporting_count(2)
            .reporting_count(-1),
    );
    let (session, mut events) =
        DiscoverySession::new(backend.clone(), &support::config(Duration::ZERO));
    let mut observer = RecordingObserver::new(&seen);

    let first = support::scan(&session, &mut events, &mut observer).await;
    assert_eq!(first, Ok(2));

    let second = support::scan(&session, &mut events, &mut observer).await;
    assert_eq!(
        second,
        Err(SessionError::CollectFailed(
            flock_common::backend::BackendError::Code(-1)
        ))
    );

    assert_eq!(observer.model.devices().len(), 2);
    assert_eq!(
        observer.model.status(),
        "error getting discovered devices: error code -1"
    );
    assert_eq!(backend.stop_calls(), 2);

    let device_lists = support::entries(&seen)
        .iter()
        .filter(|line| line.starts_with("devices("))
        .count();
    assert_eq!(device_lists, 1);
}

#[tokio::test]
async fn session_can_scan_again_after_going_idle() -> anyhow::Result<()> {
    let backend = Arc::new(
        ScriptedBackend::new(&support::journal()).with_device("NAS", "192.168.1.9", "445"),
    );
    let (session, mut events) =
        DiscoverySession::new(backend.clone(), &support::config(Duration::ZERO));
    let mut observer = RecordingObserver::new(&support::journal());

    for _ in 0..3 {
        assert_eq!(support::scan(&session, &mut events, &mut observer).await?, 1);
        assert_eq!(session.state(), SessionState::Idle);
    }

    assert_eq!(backend.start_calls(), 3);
    assert_eq!(backend.stop_calls(), 3);
    Ok(())
}
