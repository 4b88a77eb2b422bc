mod utils;

use rstest::rstest;
use std::sync::Arc;

use utils::{settle, EventLog, FailingConnector, RecordingConnector, TestSetupBuilder};
use wizard_sync::{
    channel::{ChannelMessage, InMemoryChannelHub},
    create_game_system, EventName, GameEvent, GameSystem, GameSystemError, PlayerRoster,
    SessionConfig, SessionServices,
};

fn offline_services(players: &[&str]) -> SessionServices {
    SessionServices::new(Arc::new(PlayerRoster::with_participants(
        players.iter().copied(),
    )))
}

// ============================================================================
// Facade equivalence
// ============================================================================

#[tokio::test]
async fn test_local_and_networked_deliver_the_same_event_locally() {
    let local = create_game_system(&SessionConfig::offline(&["p1"]), offline_services(&["p1"]))
        .await
        .unwrap();
    let connector = Arc::new(RecordingConnector::new("ROOM01"));
    let networked = create_game_system(
        &SessionConfig::online_new_room("p1", Some("ROOM01")),
        offline_services(&["p1"]).with_connector(connector.clone()),
    )
    .await
    .unwrap();

    let local_log = EventLog::attach(local.events());
    let networked_log = EventLog::attach(networked.events());

    local.emit_exp_change(10);
    networked.emit_exp_change(10);

    assert_eq!(local_log.events(), vec![GameEvent::exp_change(10)]);
    assert_eq!(networked_log.events(), local_log.events());
    assert_eq!(connector.channel.sent_names(), vec![EventName::ExpChange]);
    assert_eq!(connector.joined_rooms(), vec!["ROOM01".to_string()]);
}

#[tokio::test]
async fn test_buff_barrier_with_two_local_players() {
    let system = create_game_system(
        &SessionConfig::offline(&["p1", "p2"]),
        offline_services(&["p1", "p2"]),
    )
    .await
    .unwrap();
    let log = EventLog::attach(system.events());

    system.emit_apply_buff("p1", "fire");
    assert!(log.events().is_empty());

    system.emit_apply_buff("p2", "ice");
    assert_eq!(
        log.events(),
        vec![
            GameEvent::buff_apply("p1", "fire"),
            GameEvent::buff_apply("p2", "ice")
        ]
    );
}

// ============================================================================
// Replay
// ============================================================================

#[tokio::test]
async fn test_creator_replays_creation_before_start_exactly_once() {
    let connector = Arc::new(RecordingConnector::new("ROOM01"));
    let system = create_game_system(
        &SessionConfig::online_new_room("p1", Some("ROOM01")),
        offline_services(&["p1"]).with_connector(connector.clone()),
    )
    .await
    .unwrap();

    let log = EventLog::attach(system.events());

    system.emit_create_player("p1", "warrior");
    system.emit_game_start();

    let sent = connector.channel.sent();
    assert_eq!(
        sent.iter().map(|m| m.event).collect::<Vec<_>>(),
        vec![EventName::CreatePlayer, EventName::GameStart]
    );
    assert_eq!(
        sent[0].payload,
        serde_json::json!({ "participant_id": "p1", "character_id": "warrior" })
    );

    system.emit_game_start();
    assert_eq!(
        connector.channel.sent_names(),
        vec![
            EventName::CreatePlayer,
            EventName::GameStart,
            EventName::GameStart
        ]
    );
    assert_eq!(log.count(EventName::CreatePlayer), 1);
}

#[tokio::test]
async fn test_inbound_creations_wait_for_game_start() {
    let connector = Arc::new(RecordingConnector::new("ROOM01"));
    let system = create_game_system(
        &SessionConfig::online_join_room("p2", "ROOM01"),
        offline_services(&["p2"]).with_connector(connector.clone()),
    )
    .await
    .unwrap();
    let log = EventLog::attach(system.events());

    connector.push_inbound(
        ChannelMessage::from_event(&GameEvent::create_player("p1", "warrior", true)).unwrap(),
    );
    connector.push_inbound(
        ChannelMessage::from_event(&GameEvent::coin_change(3)).unwrap(),
    );

    // The coin change overtakes the held creation
    assert_eq!(log.wait_for(1).await, vec![GameEvent::coin_change(3)]);

    connector.push_inbound(ChannelMessage::from_event(&GameEvent::GameStart).unwrap());
    assert_eq!(
        log.wait_for(3).await,
        vec![
            GameEvent::coin_change(3),
            GameEvent::create_player("p1", "warrior", false),
            GameEvent::GameStart,
        ]
    );
}

// ============================================================================
// Factory
// ============================================================================

#[rstest]
#[case::unknown_kind(SessionConfig {
    kind: "lan".to_string(),
    start_mode: "offline_1p".to_string(),
    room_id: None,
    local_participants: vec!["p1".to_string()],
})]
#[case::unknown_start_mode(SessionConfig {
    kind: "offline".to_string(),
    start_mode: "offline_9p".to_string(),
    room_id: None,
    local_participants: vec!["p1".to_string()],
})]
#[case::mode_contradicts_kind(SessionConfig {
    kind: "offline".to_string(),
    start_mode: "join_room".to_string(),
    room_id: Some("ROOM01".to_string()),
    local_participants: vec!["p1".to_string()],
})]
#[case::join_without_room(SessionConfig {
    kind: "online".to_string(),
    start_mode: "join_room".to_string(),
    room_id: None,
    local_participants: vec!["p1".to_string()],
})]
#[case::room_id_with_path_separator(SessionConfig {
    kind: "online".to_string(),
    start_mode: "join_room".to_string(),
    room_id: Some("ROOM01/admin".to_string()),
    local_participants: vec!["p1".to_string()],
})]
#[case::no_participants(SessionConfig {
    kind: "offline".to_string(),
    start_mode: "offline_1p".to_string(),
    room_id: None,
    local_participants: vec![],
})]
#[tokio::test]
async fn test_factory_rejects_bad_configuration(#[case] config: SessionConfig) {
    let services = offline_services(&["p1"]).with_connector(Arc::new(RecordingConnector::new("x")));

    let result = create_game_system(&config, services).await;

    assert!(matches!(result, Err(GameSystemError::Configuration(_))));
}

#[tokio::test]
async fn test_join_failure_is_returned_to_caller() {
    let services = offline_services(&["p2"]).with_connector(Arc::new(FailingConnector));

    let result =
        create_game_system(&SessionConfig::online_join_room("p2", "ROOM01"), services).await;

    assert!(matches!(result, Err(GameSystemError::ChannelJoin(_))));
}

#[tokio::test]
async fn test_private_room_rejects_outsiders() {
    let hub = InMemoryChannelHub::new();
    hub.make_private("ROOM01", ["p1"]);
    let services = offline_services(&["p2"]).with_connector(Arc::new(hub.connector("p2")));

    let result =
        create_game_system(&SessionConfig::online_join_room("p2", "ROOM01"), services).await;

    assert!(matches!(result, Err(GameSystemError::ChannelJoin(_))));
    assert_eq!(hub.member_count("ROOM01"), 0);
}

// ============================================================================
// Peers in one room
// ============================================================================

#[tokio::test]
async fn test_peer_events_reach_the_other_peer() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let alice = setup.peer("alice");
    let bob = setup.peer("bob");

    alice.system.emit_player_hp_change("alice", -7);

    assert_eq!(
        alice.log.events(),
        vec![GameEvent::player_hp_change("alice", -7)]
    );
    assert_eq!(
        bob.log.wait_for(1).await,
        vec![GameEvent::player_hp_change("alice", -7)]
    );
}

#[tokio::test]
async fn test_every_peer_creates_every_participant_once() {
    let mut setup = TestSetupBuilder::new().with_two_players().build().await;

    setup.peer("alice").system.emit_create_player("alice", "warrior");
    setup.peer("bob").system.emit_create_player("bob", "mage");
    // Let both listeners take in the other's announcement
    settle().await;

    // carol joins after both announcements were sent
    setup.join_late("carol").await;

    setup.peer("alice").system.emit_game_start();

    let carol = setup.peer("carol").log.wait_for(3).await;
    assert_eq!(
        carol,
        vec![
            GameEvent::create_player("alice", "warrior", false),
            GameEvent::create_player("bob", "mage", false),
            GameEvent::GameStart,
        ]
    );

    let bob = setup.peer("bob").log.wait_for(3).await;
    assert_eq!(bob.iter().filter(|e| e.name() == EventName::CreatePlayer).count(), 2);
    assert_eq!(setup.peer("bob").log.count(EventName::GameStart), 1);
    assert_eq!(setup.peer("alice").log.count(EventName::CreatePlayer), 2);
}

#[tokio::test]
async fn test_dropping_a_peer_leaves_the_room() {
    let mut setup = TestSetupBuilder::new().with_two_players().build().await;
    assert_eq!(setup.hub.member_count("ROOM01"), 2);

    let bob = setup.peers.pop().unwrap();
    drop(bob);
    settle().await;

    assert_eq!(setup.hub.member_count("ROOM01"), 1);
}
