pub mod common;

use it_tickets::api;
use reqwest::StatusCode;
use serde_json::json;

async fn total_count(client: &common::Client) -> usize {
    client
        .get_tickets("", "ALL")
        .await
        .expect("failed to list tickets")
        .total_count
}

#[tokio::test]
async fn lists_seeded_tickets() {
    let client = common::Client::spawn().await;

    let list = client
        .get_tickets("", "ALL")
        .await
        .expect("failed to list tickets");
    assert_eq!(list.total_count, 3);
    let ids = list
        .tickets
        .iter()
        .map(|t| t.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[tokio::test]
async fn filters_by_search_and_status() {
    let client = common::Client::spawn().await;

    let list = client
        .get_tickets("printer", "ALL")
        .await
        .expect("failed to list tickets");
    match list.tickets.as_slice() {
        [ticket] => assert_eq!(ticket.id.as_str(), "3"),
        found => panic!("expected one ticket, found {found:?}"),
    }
    assert_eq!(list.total_count, 3);

    let list = client
        .get_tickets("", "PROCESS")
        .await
        .expect("failed to list tickets");
    match list.tickets.as_slice() {
        [ticket] => assert_eq!(ticket.status, api::ticket::Status::Process),
        found => panic!("expected one ticket, found {found:?}"),
    }
}

#[tokio::test]
async fn rejects_unknown_status_filter() {
    let client = common::Client::spawn().await;

    let status = client
        .get_tickets("", "OPEN")
        .await
        .expect_err("unknown status was accepted");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn counts_tickets_per_status() {
    let client = common::Client::spawn().await;

    let stats = client.stats().await;
    assert_eq!(
        stats,
        api::ticket::Stats {
            total: 3,
            pending: 1,
            process: 1,
            done: 1,
        }
    );
}

#[tokio::test]
async fn retrieves_ticket() {
    let client = common::Client::spawn().await;

    let ticket = client
        .get_ticket(&api::ticket::Id::from("2"))
        .await
        .expect("failed to get ticket");
    assert_eq!(ticket.issue, "Install Ulang Accurate Server");
    assert_eq!(ticket.kind, api::ticket::Kind::Sw);

    let status = client
        .get_ticket(&api::ticket::Id::from("404"))
        .await
        .expect_err("missing ticket was found");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creates_valid_ticket() {
    let client = common::Client::admin().await;

    let ticket = client
        .add_ticket(common::new_ticket("Monitor flickers"))
        .await
        .expect("failed to add ticket");
    assert_eq!(ticket.issue, "Monitor flickers");
    assert_eq!(ticket.company, "PT Padma Jarka Abadi");
    assert_eq!(ticket.pic, "GILANG PERMANA");
    assert_eq!(ticket.status, api::ticket::Status::Pending);
    assert_eq!(ticket.priority, api::ticket::Priority::Normal);
    assert_eq!(ticket.date.to_string(), "2025-01-01");

    let list = client
        .get_tickets("", "ALL")
        .await
        .expect("failed to list tickets");
    assert_eq!(list.total_count, 4);
    let stored = client
        .get_ticket(&ticket.id)
        .await
        .expect("failed to get ticket");
    assert_eq!(stored, ticket);
}

#[tokio::test]
async fn fills_defaults_on_creation() {
    let client = common::Client::admin().await;

    let ticket = client
        .add_ticket(json!({
            "company": "PT Sumber Santoso Abadi",
            "pic": "NURUL INAYAH",
            "issue": "Cannot print",
            "photoUrl": "blob:http://localhost/1",
        }))
        .await
        .expect("failed to add ticket");
    assert_eq!(ticket.kind, api::ticket::Kind::Hw);
    assert_eq!(ticket.status, api::ticket::Status::Pending);
    assert_eq!(ticket.priority, api::ticket::Priority::Normal);
    assert_eq!(ticket.date, it_tickets::db::ticket::today());
}

#[tokio::test]
async fn cant_create_when_not_admin() {
    let client = common::Client::spawn().await;

    let (status, _) = client
        .add_ticket(common::new_ticket("Monitor flickers"))
        .await
        .expect_err("guest created a ticket");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cant_create_without_company() {
    let client = common::Client::admin().await;

    let mut body = common::new_ticket("Monitor flickers");
    body["company"] = json!("");
    let (status, message) = client
        .add_ticket(body)
        .await
        .expect_err("invalid draft was accepted");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(message, "date, company, PIC and issue are required");

    let list = client
        .get_tickets("", "ALL")
        .await
        .expect("failed to list tickets");
    assert_eq!(list.total_count, 3);
}

#[tokio::test]
async fn asks_before_creating_without_photo() {
    let client = common::Client::admin().await;

    let mut body = common::new_ticket("Keyboard missing keys");
    body.as_object_mut()
        .expect("ticket body is not an object")
        .remove("photoUrl");

    let (status, _) = client
        .add_ticket(body.clone())
        .await
        .expect_err("ticket without photo was saved unconfirmed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(total_count(&client).await, 3);

    body["confirmWithoutPhoto"] = json!(true);
    let ticket =
        client.add_ticket(body).await.expect("failed to add ticket");
    assert_eq!(ticket.photo_url, None);
    assert_eq!(total_count(&client).await, 4);
}

#[tokio::test]
async fn edits_ticket() {
    let client = common::Client::admin().await;

    let id = api::ticket::Id::from("1");
    let ticket = client
        .edit_ticket(&id, json!({ "status": "DONE" }))
        .await
        .expect("failed to edit ticket");
    assert_eq!(ticket.id, id);
    assert_eq!(ticket.status, api::ticket::Status::Done);
    assert_eq!(ticket.issue, "PC Admin Gudang Mati Total (PSU)");
    assert_eq!(ticket.priority, api::ticket::Priority::High);

    let list = client
        .get_tickets("", "ALL")
        .await
        .expect("failed to list tickets");
    assert_eq!(list.total_count, 3);
    let stored = client.get_ticket(&id).await.expect("failed to get ticket");
    assert_eq!(stored, ticket);
}

#[tokio::test]
async fn edits_without_photo_need_no_confirmation() {
    let client = common::Client::admin().await;

    let ticket = client
        .add_ticket(json!({
            "company": "PT Padma Jarka Abadi",
            "pic": "GILANG PERMANA",
            "issue": "No photo",
            "confirmWithoutPhoto": true,
        }))
        .await
        .expect("failed to add ticket");
    let edited = client
        .edit_ticket(&ticket.id, json!({ "issue": "Still no photo" }))
        .await
        .expect("failed to edit ticket");
    assert_eq!(edited.issue, "Still no photo");
    assert_eq!(edited.photo_url, None);
}

#[tokio::test]
async fn cant_edit_missing_ticket() {
    let client = common::Client::admin().await;

    let (status, _) = client
        .edit_ticket(&api::ticket::Id::from("missing"), json!({}))
        .await
        .expect_err("missing ticket was edited");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cant_edit_with_unknown_technician() {
    let client = common::Client::admin().await;

    let (status, message) = client
        .edit_ticket(&api::ticket::Id::from("1"), json!({ "pic": "BOB" }))
        .await
        .expect_err("invalid draft was accepted");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(message, "unknown technician `BOB`");
}

#[tokio::test]
async fn deletes_ticket_after_confirmation() {
    let client = common::Client::admin().await;
    let id = api::ticket::Id::from("2");

    assert_eq!(client.delete_ticket(&id, false).await, StatusCode::CONFLICT);
    assert!(client.get_ticket(&id).await.is_ok());

    assert_eq!(client.delete_ticket(&id, true).await, StatusCode::NO_CONTENT);
    assert_eq!(
        client
            .get_ticket(&id)
            .await
            .expect_err("deleted ticket was found"),
        StatusCode::NOT_FOUND,
    );

    // Deleting again is a no-op.
    assert_eq!(client.delete_ticket(&id, true).await, StatusCode::NO_CONTENT);
    assert_eq!(total_count(&client).await, 2);
}

#[tokio::test]
async fn cant_delete_when_not_admin() {
    let client = common::Client::spawn().await;

    let status = client
        .delete_ticket(&api::ticket::Id::from("1"), true)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
