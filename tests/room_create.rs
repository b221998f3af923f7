mod support;

use skirmish::interface_adapters::protocol::RoomCreatedDto;

#[tokio::test]
async fn test_room_creation() {
    let base_url = support::ensure_relay();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{base_url}/rooms"))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: RoomCreatedDto = res.json().await.expect("room code body");
    assert_eq!(created.room_code.len(), 5);
    assert!(created.room_code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[tokio::test]
async fn test_room_codes_are_distinct() {
    let base_url = support::ensure_relay();
    let client = reqwest::Client::new();

    let mut codes = Vec::new();
    for _ in 0..5 {
        let created: RoomCreatedDto = client
            .post(format!("{base_url}/rooms"))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("room code body");
        codes.push(created.room_code);
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 5);
}
