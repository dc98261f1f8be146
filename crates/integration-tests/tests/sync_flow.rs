//! Pull / push / status / create against a document server over HTTP

mod common;

use common::{context, stamped, write_spec, FakeServer, SPEC_BODY};

use cspress_core::application::commands::PushOutcome;
use cspress_core::application::{CommandFrame, ContentSpecService, ToolSettings};
use cspress_core::domain::{header_token, CancellationToken, ExitStatus, SyncState};
use cspress_core::port::ServerError;
use cspress_core::AppError;
use cspress_infra_system::Console;

async fn setup() -> (FakeServer, ContentSpecService, tempfile::TempDir) {
    let server = FakeServer::start().await;
    let ctx = context(&server.url, &Console::captured(), ToolSettings::default());
    (server, ContentSpecService::new(ctx), tempfile::tempdir().unwrap())
}

fn frame(command: &'static str) -> CommandFrame {
    CommandFrame::new(command, CancellationToken::never())
}

#[tokio::test]
async fn test_pull_then_status_is_up_to_date() {
    let (server, service, dir) = setup().await;
    server.put(7, SPEC_BODY);
    let path = dir.path().join("7-post.contentspec");

    let pulled = service
        .pull(&frame("pull"), 7, Some(path.clone()))
        .await
        .unwrap();

    assert_eq!(pulled.path, path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), stamped(SPEC_BODY));
    assert_eq!(pulled.checksum.as_deref(), header_token(&stamped(SPEC_BODY)));

    let status = service.status(&frame("status"), &path).await.unwrap();
    assert_eq!(status.id, 7);
    assert_eq!(status.state, SyncState::UpToDate);
}

#[tokio::test]
async fn test_local_edit_is_pushed_and_restamped() {
    let (server, service, dir) = setup().await;
    server.put(7, SPEC_BODY);
    let path = dir.path().join("guide.contentspec");
    service.pull(&frame("pull"), 7, Some(path.clone())).await.unwrap();

    let edited = std::fs::read_to_string(&path).unwrap() + "Chapter: Setup\n";
    std::fs::write(&path, &edited).unwrap();

    let status = service.status(&frame("status"), &path).await.unwrap();
    assert_eq!(status.state, SyncState::LocalModified);

    let outcome = service.push(&frame("push"), &path).await.unwrap();
    let expected = stamped(&format!("{}Chapter: Setup\n", SPEC_BODY));
    match outcome {
        PushOutcome::Pushed { id, checksum, .. } => {
            assert_eq!(id, 7);
            assert_eq!(checksum.as_deref(), header_token(&expected));
        }
        other => panic!("expected a push, got {:?}", other),
    }

    assert_eq!(server.text(7).unwrap(), expected);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    let status = service.status(&frame("status"), &path).await.unwrap();
    assert_eq!(status.state, SyncState::UpToDate);
}

#[tokio::test]
async fn test_unchanged_push_sends_nothing() {
    let (server, service, dir) = setup().await;
    server.put(7, SPEC_BODY);
    let path = dir.path().join("guide.contentspec");
    service.pull(&frame("pull"), 7, Some(path.clone())).await.unwrap();

    let outcome = service.push(&frame("push"), &path).await.unwrap();

    assert_eq!(outcome, PushOutcome::Unchanged { id: 7 });
    assert!(server.requests().iter().all(|r| !r.starts_with("PUT ")));
}

#[tokio::test]
async fn test_push_refused_when_server_moved_on() {
    let (server, service, dir) = setup().await;
    server.put(7, SPEC_BODY);
    let path = dir.path().join("guide.contentspec");
    service.pull(&frame("pull"), 7, Some(path.clone())).await.unwrap();
    let local = std::fs::read_to_string(&path).unwrap();

    server.put(7, &format!("{}Chapter: Server side\n", SPEC_BODY));

    let err = service.push(&frame("push"), &path).await.unwrap_err();
    assert!(matches!(err, AppError::OutOfDate(SyncState::ServerModified)));
    assert_eq!(err.exit_status(), ExitStatus::OutOfDate);
    // Local file untouched
    assert_eq!(std::fs::read_to_string(&path).unwrap(), local);

    std::fs::write(&path, format!("{}Chapter: Local side\n", local)).unwrap();
    let err = service.push(&frame("push"), &path).await.unwrap_err();
    assert!(matches!(err, AppError::OutOfDate(SyncState::BothModified)));
}

#[tokio::test]
async fn test_push_without_header_is_refused() {
    let (server, service, dir) = setup().await;
    server.put(7, SPEC_BODY);
    let path = write_spec(dir.path(), "guide.contentspec", SPEC_BODY);

    let err = service.push(&frame("push"), &path).await.unwrap_err();

    assert!(matches!(err, AppError::MissingChecksum(_)));
    assert_eq!(err.exit_status(), ExitStatus::OutOfDate);
}

#[tokio::test]
async fn test_create_assigns_id_and_stamps_file() {
    let (server, service, dir) = setup().await;
    let path = write_spec(
        dir.path(),
        "new.contentspec",
        "Title = New Book\nProduct = Docs\nVersion = 2\n\nChapter: One\n",
    );

    let outcome = service.create(&frame("create"), &path).await.unwrap();

    assert_eq!(outcome.id, Some(100));
    let local = std::fs::read_to_string(&path).unwrap();
    assert_eq!(local, server.text(100).unwrap());
    assert!(local.contains("ID = 100"));

    let status = service.status(&frame("status"), &path).await.unwrap();
    assert_eq!(status.state, SyncState::UpToDate);
}

#[tokio::test]
async fn test_info_reports_title_and_revision() {
    let (server, service, _dir) = setup().await;
    server.put(7, SPEC_BODY);
    server.put(7, SPEC_BODY);

    let info = service.info(&frame("info"), 7).await.unwrap();

    assert_eq!(info.id, 7);
    assert_eq!(info.title.as_deref(), Some("Admin Guide"));
    assert_eq!(info.revision, Some(2));
}

#[tokio::test]
async fn test_unknown_id_is_server_error() {
    let (_server, service, dir) = setup().await;
    let path = dir.path().join("missing.contentspec");

    let err = service
        .pull(&frame("pull"), 404, Some(path.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Server(ServerError::NotFound(404))));
    assert_eq!(err.exit_status(), ExitStatus::ServerError);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_checksum_write_restamps_edited_file() {
    let (_server, service, dir) = setup().await;
    let path = write_spec(dir.path(), "guide.contentspec", &stamped(SPEC_BODY));
    std::fs::write(&path, format!("{}Chapter: Extra\n", stamped(SPEC_BODY))).unwrap();

    let outcome = service
        .checksum(&frame("checksum"), &path, true)
        .await
        .unwrap();

    assert!(outcome.rewritten);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        stamped(&format!("{}Chapter: Extra\n", SPEC_BODY))
    );
}
