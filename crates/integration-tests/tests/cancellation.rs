//! Interrupt handling across the command frame, the supervisor and real children
#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use common::{context, write_spec, FakeServer, SPEC_BODY};

use cspress_core::application::{CommandFrame, ContentSpecService, ToolSettings};
use cspress_core::domain::{cancellation_channel, CancellationState, ExitStatus, Phase};
use cspress_core::AppError;
use cspress_infra_system::Console;

#[tokio::test]
async fn test_interrupt_during_build_stops_child() {
    let server = FakeServer::start().await;
    let console = Console::captured();
    let settings = ToolSettings {
        build_command: "echo started; sleep 30".to_string(),
        ..ToolSettings::default()
    };
    let service = ContentSpecService::new(context(&server.url, &console, settings));
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "guide.contentspec", SPEC_BODY);

    let (source, token) = cancellation_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        source.cancel();
    });

    let started = Instant::now();
    let err = service
        .assemble(&CommandFrame::new("assemble", token), &spec, true)
        .await
        .unwrap_err();

    assert!(err.is_shutdown());
    assert_eq!(err.exit_status(), ExitStatus::ShutdownRequested);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(console.captured_stdout(), "started\n");
}

#[tokio::test]
async fn test_interrupt_before_pull_touches_nothing() {
    let server = FakeServer::start().await;
    server.put(7, SPEC_BODY);
    let service = ContentSpecService::new(context(
        &server.url,
        &Console::captured(),
        ToolSettings::default(),
    ));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.contentspec");

    let (source, token) = cancellation_channel();
    source.cancel();

    let err = service
        .pull(&CommandFrame::new("pull", token), 7, Some(path.clone()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::ShutdownRequested {
            phase: Phase::ContactServer
        }
    ));
    assert!(server.requests().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_parent_interrupt_reaches_child_scope() {
    let server = FakeServer::start().await;
    let service = ContentSpecService::new(context(
        &server.url,
        &Console::captured(),
        ToolSettings {
            // Placeholder keeps the file name out of sleep's arguments
            editor: "sleep 30 # {path}".to_string(),
            ..ToolSettings::default()
        },
    ));
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "guide.contentspec", SPEC_BODY);

    let (root, token) = cancellation_channel();
    let (_scope, child) = token.child();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        root.cancel();
    });

    let err = service
        .edit(&CommandFrame::new("edit", child.clone()), &spec)
        .await
        .unwrap_err();

    assert!(err.is_shutdown());
    assert_eq!(child.state(), CancellationState::ShutdownRequested);
    // Editor was stopped before it could touch the file
    assert_eq!(std::fs::read_to_string(&spec).unwrap(), SPEC_BODY);
}

#[tokio::test]
async fn test_every_waiter_observes_cancellation() {
    let (source, token) = cancellation_channel();
    let waiters: Vec<_> = (0..32)
        .map(|_| {
            let token = token.clone();
            tokio::spawn(async move {
                token.cancelled().await;
                token.is_cancelled()
            })
        })
        .collect();

    assert!(source.cancel());
    assert!(!source.cancel());

    for waiter in waiters {
        let observed = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(observed);
    }
}
