use frontdesk::{
    domain::{ReservationFilter, ReservationStatus, TableFilter, TableId, TableStatus},
    floor_view::FloorView,
    live::{LiveChannel, LiveEvent, LiveSync},
    notifier::Severity,
};
use wiremock::{
    matchers::{any, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{reservation, reservation_json, table, table_json, guest_name, TestFloor};

fn attach(floor: &TestFloor, channel: &LiveChannel) -> LiveSync {
    LiveSync::attach(channel, floor.client.clone(), floor.notifier.clone())
}

#[tokio::test]
async fn echo_of_a_state_already_held_is_a_silent_no_op() {
    let mut floor = TestFloor::spawn().await;
    floor.view.tables.replace_all(vec![table("T12", "reserved")]);
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&floor.backend)
        .await;

    let channel = LiveChannel::new(16);
    let mut sync = attach(&floor, &channel);
    channel.publish(LiveEvent::TableUpdated(table("T12", "reserved")));
    channel.publish(LiveEvent::TableStatusChanged{
        table_id: TableId::new("T12"),
        table_number: Some("T12".into()),
        status: TableStatus::Reserved
    });

    assert_eq!(sync.drain(&mut floor.view).await, 0);
    assert!(floor.notifications().is_empty());
}

#[tokio::test]
async fn status_change_from_another_client_is_announced_once() {
    let mut floor = TestFloor::spawn().await;
    floor.view.tables.replace_all(vec![table("T4", "available")]);

    let channel = LiveChannel::new(16);
    let mut sync = attach(&floor, &channel);
    let frame = serde_json::json!(["tableUpdated", table_json("T4", "occupied")]).to_string();
    channel.publish_frame(&frame).unwrap();
    channel.publish_frame(&frame).unwrap();

    assert_eq!(sync.drain(&mut floor.view).await, 1);
    assert_eq!(
        floor.view.tables.get(&TableId::new("T4")).map(|t| t.status),
        Some(TableStatus::Occupied)
    );

    let notifications = floor.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Table Occupied");
    assert_eq!(notifications[0].message, "Table T4 is currently occupied");
    assert_eq!(notifications[0].severity, Severity::Warning);
}

#[tokio::test]
async fn status_change_for_an_unknown_table_fetches_it() {
    let mut floor = TestFloor::spawn().await;
    Mock::given(method("GET"))
        .and(path("/tables/T9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json("T9", "dirty")))
        .expect(1)
        .mount(&floor.backend)
        .await;

    let channel = LiveChannel::new(16);
    let mut sync = attach(&floor, &channel);
    channel
        .publish_frame(r#"["tableStatusChanged", {"tableId": "T9", "tableNumber": "9", "status": "dirty"}]"#)
        .unwrap();

    assert_eq!(sync.drain(&mut floor.view).await, 1);
    assert!(floor.view.tables.get(&TableId::new("T9")).is_some());
    assert_eq!(floor.notifications()[0].message, "Table 9 needs cleaning");
}

#[tokio::test]
async fn bulk_update_without_records_refetches_the_table_list() {
    let mut floor = TestFloor::spawn().await;
    floor.view.tables.replace_all(vec![table("T1", "available"), table("T2", "available")]);
    Mock::given(method("GET"))
        .and(path("/tables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [table_json("T1", "maintenance"), table_json("T2", "maintenance")]
        })))
        .expect(1)
        .mount(&floor.backend)
        .await;

    let channel = LiveChannel::new(16);
    let mut sync = attach(&floor, &channel);
    channel
        .publish_frame(r#"["tablesUpdated", {"tableIds": ["T1", "T2"]}]"#)
        .unwrap();

    assert_eq!(sync.drain(&mut floor.view).await, 1);
    assert!(floor.view.tables.iter().all(|t| t.status == TableStatus::Maintenance));
    assert_eq!(floor.notifications()[0].message, "2 tables updated");
}

#[tokio::test]
async fn lagging_view_resyncs_both_collections() {
    let mut floor = TestFloor::spawn().await;
    Mock::given(method("GET"))
        .and(path("/tables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![table_json("T1", "available")]))
        .expect(1)
        .mount(&floor.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/reservations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![reservation_json("R1", &guest_name(), "pending")]))
        .expect(1)
        .mount(&floor.backend)
        .await;

    let channel = LiveChannel::new(1);
    let mut sync = attach(&floor, &channel);
    for id in ["a", "b", "c"] {
        channel.publish(LiveEvent::TableDeleted(TableId::new(id)));
    }

    sync.drain(&mut floor.view).await;

    assert_eq!(floor.view.tables.len(), 1);
    assert_eq!(floor.view.pending_queue().len(), 1);
}

#[tokio::test]
async fn confirmed_reservation_leaves_a_pending_only_view() {
    let mut floor = TestFloor::spawn().await;
    floor.view = FloorView::new(
        TableFilter::default(),
        ReservationFilter{ status: Some(ReservationStatus::Pending), ..Default::default() }
    );
    floor.view.reservations.replace_all(vec![reservation("R1", "pending")]);

    let channel = LiveChannel::new(16);
    let mut sync = attach(&floor, &channel);
    let mut confirmed = reservation("R1", "confirmed");
    confirmed.assigned_table = Some(TableId::new("T12"));
    channel.publish(LiveEvent::ReservationStatusChanged(confirmed));

    assert_eq!(sync.next(&mut floor.view).await, Some(true));
    assert!(floor.view.reservations.is_empty());

    let notifications = floor.notifications();
    assert_eq!(notifications[0].title, "Reservation Updated");
    assert_eq!(notifications[0].message, "Reservation has been confirmed");
    assert_eq!(notifications[0].severity, Severity::Success);
}

#[tokio::test]
async fn detached_view_stops_receiving_events() {
    let floor = TestFloor::spawn().await;
    let channel = LiveChannel::new(16);
    let sync = attach(&floor, &channel);
    assert_eq!(channel.subscriber_count(), 1);

    sync.detach();

    assert_eq!(channel.publish(LiveEvent::TableDeleted(TableId::new("T1"))), 0);
    assert!(channel.publish_frame(r#"["somethingElse", {}]"#).is_err());
}
