// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Voltage bridge under the real broadcast publisher

use pcb_inspection_node::voltage::{
    expected_voltage, BroadcastPublisher, EventPublisher, ResumeCommand, ScanCommand,
    VoltageBridge, VoltageStatus, EXPECTED_VOLTAGES, VOLTAGE_UPDATE_EVENT,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

fn bridge_with_channel(capacity: usize) -> (Arc<VoltageBridge>, BroadcastPublisher) {
    let events = BroadcastPublisher::new(capacity);
    let publisher: Arc<dyn EventPublisher> = Arc::new(events.clone());
    (Arc::new(VoltageBridge::new(publisher)), events)
}

#[tokio::test]
async fn test_full_scan_sequence() {
    let (bridge, events) = bridge_with_channel(EXPECTED_VOLTAGES.len());
    let mut receiver = events.subscribe();

    // Every point reads exactly as expected
    for (point, volts) in EXPECTED_VOLTAGES {
        let outcome = bridge.report(point, *volts);
        assert_eq!(outcome.command, ScanCommand::Continue);
        assert_eq!(outcome.status, VoltageStatus::Ok);
    }

    for (point, _) in EXPECTED_VOLTAGES {
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event, VOLTAGE_UPDATE_EVENT);
        assert_eq!(event.data["point"], *point);
        assert_eq!(event.data["status"], "OK");
    }
    assert_eq!(bridge.check_resume(), ResumeCommand::Resume);
}

#[tokio::test]
async fn test_tolerance_boundaries() {
    let (bridge, _events) = bridge_with_channel(16);

    assert_eq!(expected_voltage("B1"), Some(3.3));
    assert_eq!(bridge.report("B1", 3.06).status, VoltageStatus::Ok);
    assert_eq!(bridge.report("B1", 3.54).status, VoltageStatus::Ok);
    assert_eq!(bridge.report("B1", 3.0).status, VoltageStatus::NotOk);
    bridge.resume();

    assert_eq!(bridge.report("A1", -0.2).status, VoltageStatus::Ok);
    assert_eq!(bridge.report("A1", 0.3).status, VoltageStatus::NotOk);
}

#[tokio::test]
async fn test_lagging_subscriber_skips_old_events() {
    let (bridge, events) = bridge_with_channel(2);
    let mut receiver = events.subscribe();

    for value in [3.3, 3.2, 3.1, 3.25] {
        bridge.report("B2", value);
    }

    match receiver.recv().await {
        Err(RecvError::Lagged(skipped)) => assert_eq!(skipped, 2),
        other => panic!("expected lag, got {:?}", other),
    }
    let event = receiver.recv().await.unwrap();
    assert_eq!(event.data["value"], 3.1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reports_and_polls() {
    let (bridge, _events) = bridge_with_channel(64);

    let mut handles = Vec::new();
    for i in 0..8 {
        let bridge = bridge.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..50 {
                // Odd tasks report failures, even tasks passing readings
                let value = if i % 2 == 0 { 3.3 } else { 0.0 };
                bridge.report("B3", value);
                bridge.check_resume();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let state = bridge.snapshot();
    assert!(state.paused);
    assert_eq!(state.failed_point.as_deref(), Some("B3"));

    bridge.resume();
    assert_eq!(bridge.check_resume(), ResumeCommand::Resume);
    assert!(bridge.snapshot().failed_point.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_flag_observed_once_across_pollers() {
    let (bridge, _events) = bridge_with_channel(4);
    bridge.request_reset();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let bridge = bridge.clone();
        handles.push(tokio::spawn(async move { bridge.check_reset() }));
    }

    let mut seen = 0;
    for handle in handles {
        if handle.await.unwrap() {
            seen += 1;
        }
    }
    assert_eq!(seen, 1);
}
