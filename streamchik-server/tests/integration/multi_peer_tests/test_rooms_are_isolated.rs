use crate::integration::create_test_server;
use crate::utils::{SILENCE_MS, TestClient, join, offer, peers};

#[tokio::test]
async fn test_rooms_are_isolated() {
    let server = create_test_server().await;

    let (mut c1, _) = TestClient::connect_welcomed(&server.url()).await.unwrap();
    let (mut c2, _) = TestClient::connect_welcomed(&server.url()).await.unwrap();
    let (mut c3, _) = TestClient::connect_welcomed(&server.url()).await.unwrap();

    c3.send_json(join("side")).await.unwrap();
    c3.recv_type("welcome").await.unwrap();
    assert_eq!(c3.recv_type("peers").await.unwrap(), peers("side", &["c3"]));

    // the default room sees c3 arrive, then leave
    while c1.recv_type("peers").await.unwrap()["count"] != 3 {}
    assert_eq!(
        c1.recv_type("peers").await.unwrap(),
        peers("room-1", &["c1", "c2"])
    );
    assert_eq!(server.state.rooms.room_count(), 2);

    c1.send_json(offer("only for room-1")).await.unwrap();
    assert_eq!(c2.recv_type("offer").await.unwrap()["from"], "c1");
    c3.expect_silence(SILENCE_MS).await.unwrap();
}
