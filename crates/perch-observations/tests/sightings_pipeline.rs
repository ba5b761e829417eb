//! End-to-end tests for the fetch + aggregate pipeline against a mock
//! eBird server.

use std::collections::HashMap;

use chrono::NaiveDate;
use perch_ebird::EbirdClient;
use perch_observations::{ChecklistFetcher, Count, ObservationAggregator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn taxonomy() -> HashMap<String, String> {
    HashMap::from([
        ("annhum".to_string(), "Anna's Hummingbird".to_string()),
        ("zebfin".to_string(), "Zebra Finch".to_string()),
        ("norcar".to_string(), "Northern Cardinal".to_string()),
    ])
}

async fn mount_visits(server: &MockServer, day_path: &str, sub_ids: &[&str]) {
    let body: Vec<serde_json::Value> = sub_ids
        .iter()
        .map(|id| serde_json::json!({"subId": id}))
        .collect();
    Mock::given(method("GET"))
        .and(path(day_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_checklist(server: &MockServer, sub_id: &str, obs: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/product/checklist/view/{}", sub_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"subId": sub_id, "obs": obs})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_day_window_merges_and_sorts() {
    let mock_server = MockServer::start().await;

    mount_visits(&mock_server, "/product/lists/L1/2024/2/15", &["S1"]).await;
    mount_visits(&mock_server, "/product/lists/L1/2024/2/14", &["S2"]).await;

    mount_checklist(
        &mock_server,
        "S1",
        serde_json::json!([
            {"speciesCode": "zebfin", "obsDt": "2024-02-15 08:00", "howManyStr": "3"},
            {"speciesCode": "norcar", "obsDt": "2024-02-15 08:05", "howManyStr": "X"}
        ]),
    )
    .await;
    mount_checklist(
        &mock_server,
        "S2",
        serde_json::json!([
            {"speciesCode": "zebfin", "obsDt": "2024-02-14 10:00", "howManyStr": "12"},
            {"speciesCode": "annhum", "obsDt": "2024-02-14 10:30", "howManyStr": "1"}
        ]),
    )
    .await;

    let client = EbirdClient::with_base_url("key", &mock_server.uri());
    let reference_date = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
    let reference_time = reference_date.and_hms_opt(12, 0, 0).unwrap();

    let checklists = ChecklistFetcher::new(&client)
        .with_reference_date(reference_date)
        .gather("L1", 2)
        .await
        .unwrap();
    let summary = ObservationAggregator::new(taxonomy())
        .with_reference_time(reference_time)
        .aggregate(&checklists)
        .unwrap();

    // Sorted by common name: Anna's Hummingbird, Northern Cardinal, Zebra Finch
    let names: Vec<&str> = summary.iter().map(|o| o.common_name.as_str()).collect();
    assert_eq!(
        names,
        ["Anna's Hummingbird", "Northern Cardinal", "Zebra Finch"]
    );

    // Zebra Finch was seen in both checklists; the recent sighting wins
    let zebfin = &summary[2];
    assert_eq!(zebfin.checklist_count, 2);
    assert_eq!(zebfin.num_obs, Count::Exact(3));
    assert_eq!(zebfin.time_since, 0);

    // Anna's Hummingbird was seen only yesterday
    let annhum = &summary[0];
    assert_eq!(annhum.checklist_count, 1);
    assert_eq!(annhum.time_since, 1);

    // "X" survives as the unspecified sentinel
    assert_eq!(summary[1].num_obs, Count::Unspecified);
}

#[tokio::test]
async fn test_unknown_species_discards_whole_summary() {
    let mock_server = MockServer::start().await;

    mount_visits(&mock_server, "/product/lists/L1/2024/2/15", &["S1"]).await;
    mount_checklist(
        &mock_server,
        "S1",
        serde_json::json!([
            {"speciesCode": "norcar", "obsDt": "2024-02-15 08:00", "howManyStr": "2"},
            {"speciesCode": "notaspecies", "obsDt": "2024-02-15 08:01", "howManyStr": "1"}
        ]),
    )
    .await;

    let client = EbirdClient::with_base_url("key", &mock_server.uri());
    let reference_date = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();

    let checklists = ChecklistFetcher::new(&client)
        .with_reference_date(reference_date)
        .gather("L1", 1)
        .await
        .unwrap();
    let summary = ObservationAggregator::new(taxonomy())
        .with_reference_time(reference_date.and_hms_opt(12, 0, 0).unwrap())
        .aggregate(&checklists)
        .unwrap();

    assert!(summary.is_empty());
}
