//! Upload pipeline scenarios
//!
//! Drives a `Session` with the scripted mock client so completion order and
//! failures can be controlled file by file.

use bgremove_gallery::{
    ChannelNotificationSink, ClientConfig, MockRemovalClient, Notification, ProcessingRequest,
    Session, Severity,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn request(name: &str) -> ProcessingRequest {
    ProcessingRequest::new(name, name.as_bytes().to_vec())
}

fn session_with(client: &MockRemovalClient) -> (Session, UnboundedReceiver<Notification>) {
    let (sink, receiver) = ChannelNotificationSink::channel();
    let session = Session::with_sink(
        Arc::new(client.clone()),
        Arc::new(sink),
        &ClientConfig::default(),
    );
    (session, receiver)
}

fn result_names(session: &Session) -> Vec<String> {
    session
        .results()
        .iter()
        .map(|r| r.file_name().to_string())
        .collect()
}

async fn wait_for_calls(client: &MockRemovalClient, count: usize) {
    while client.calls().len() < count {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn reversed_completion_appends_in_completion_order() {
    let client = MockRemovalClient::new();
    let release_a = client.gate("a.png");
    let release_b = client.gate("b.png");
    let (session, mut notifications) = session_with(&client);

    let worker = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .process_batch(vec![request("a.png"), request("b.png")])
                .await
        })
    };

    wait_for_calls(&client, 2).await;
    assert_eq!(session.pending_count(), 2);
    assert!(session.results().is_empty());

    release_b.send(()).unwrap();
    let first = notifications.recv().await.unwrap();
    assert!(first.description.contains("b.png"));
    assert_eq!(session.pending_count(), 1);
    assert_eq!(result_names(&session), vec!["b.png"]);

    release_a.send(()).unwrap();
    let second = notifications.recv().await.unwrap();
    assert!(second.description.contains("a.png"));
    assert_eq!(session.pending_count(), 0);

    let summary = worker.await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(result_names(&session), vec!["b.png", "a.png"]);
}

#[tokio::test]
async fn one_failure_in_three_keeps_the_others() {
    let client = MockRemovalClient::new().fail("b.png", "HTTP error 500");
    let release_a = client.gate("a.png");
    let release_c = client.gate("c.png");
    let (session, mut notifications) = session_with(&client);

    let worker = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .process_batch(vec![request("a.png"), request("b.png"), request("c.png")])
                .await
        })
    };
    wait_for_calls(&client, 3).await;

    release_a.send(()).unwrap();
    while session.results().is_empty() {
        tokio::task::yield_now().await;
    }
    release_c.send(()).unwrap();
    let summary = worker.await.unwrap();

    assert_eq!(summary.submitted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_files, vec!["b.png"]);
    assert_eq!(session.pending_count(), 0);
    assert_eq!(result_names(&session), vec!["a.png", "c.png"]);

    let mut received = Vec::new();
    while let Ok(n) = notifications.try_recv() {
        received.push(n);
    }
    let failures: Vec<_> = received.iter().filter(|n| n.is_error()).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].title, "Processing failed");
    assert!(failures[0].description.contains("b.png"));
    assert_eq!(
        received
            .iter()
            .filter(|n| n.severity == Severity::Success)
            .count(),
        2
    );
}

#[tokio::test]
async fn pending_count_is_conserved_across_overlapping_batches() {
    let client = MockRemovalClient::new()
        .fail("x2.png", "timeout")
        .fail("y1.png", "connection refused");
    let (session, _notifications) = session_with(&client);

    let first = session.process_batch(vec![request("x1.png"), request("x2.png"), request("x3.png")]);
    let second = session.process_batch(vec![request("y1.png"), request("y2.png")]);
    let (a, b) = tokio::join!(first, second);

    assert_eq!(session.pending_count(), 0);
    assert_eq!(a.succeeded + b.succeeded, 3);
    assert_eq!(session.results().len(), a.succeeded + b.succeeded);
    assert!(session.results().len() <= a.submitted + b.submitted);
}

#[tokio::test]
async fn pending_never_drops_below_results_gap() {
    let client = MockRemovalClient::new();
    let gates: Vec<_> = (0..4).map(|i| client.gate(format!("{i}.png"))).collect();
    let (session, mut notifications) = session_with(&client);

    let worker = {
        let session = session.clone();
        tokio::spawn(async move {
            let requests = (0..4).map(|i| request(&format!("{i}.png"))).collect();
            session.process_batch(requests).await
        })
    };
    wait_for_calls(&client, 4).await;

    for (released, gate) in gates.into_iter().rev().enumerate() {
        gate.send(()).unwrap();
        notifications.recv().await.unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.pending + snapshot.results.len(), 4);
        assert_eq!(snapshot.results.len(), released + 1);
    }

    worker.await.unwrap();
    assert_eq!(result_names(&session), vec!["3.png", "2.png", "1.png", "0.png"]);
}

#[tokio::test]
async fn clearing_results_leaves_in_flight_files_alone() {
    let client = MockRemovalClient::new();
    let release = client.gate("late.png");
    let (session, mut notifications) = session_with(&client);

    session.process_batch(vec![request("early.png")]).await;
    notifications.recv().await.unwrap();

    let worker = {
        let session = session.clone();
        tokio::spawn(async move { session.process_batch(vec![request("late.png")]).await })
    };
    wait_for_calls(&client, 2).await;

    session.clear_results();
    assert!(session.results().is_empty());
    assert_eq!(session.pending_count(), 1);

    release.send(()).unwrap();
    worker.await.unwrap();
    assert_eq!(result_names(&session), vec!["late.png"]);
    assert_eq!(session.pending_count(), 0);
}

#[tokio::test]
async fn dropped_batch_future_still_settles_every_file() {
    let client = MockRemovalClient::new();
    let release = client.gate("slow.png");
    let (session, mut notifications) = session_with(&client);

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        session.process_batch(vec![request("slow.png")]),
    )
    .await
    .is_err();
    assert!(timed_out);
    assert_eq!(session.pending_count(), 1);

    release.send(()).unwrap();
    let settled = notifications.recv().await.unwrap();
    assert!(settled.description.contains("slow.png"));
    assert_eq!(session.pending_count(), 0);
    assert_eq!(result_names(&session), vec!["slow.png"]);
}
