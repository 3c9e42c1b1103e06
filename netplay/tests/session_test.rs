use std::cell::{Cell, RefCell};
use std::rc::Rc;

use game_core::{Config, GameState, Leaderboard, Side};
use glam::Vec2;
use netplay::*;
use proto::{BallState, PeerMessage};

fn quiet_config() -> Config {
    let mut config = Config::new();
    config.obstacles_enabled = false;
    config
}

fn names(player: &str, opponent: &str) -> SessionConfig {
    SessionConfig {
        room_id: "ROOM1".into(),
        player_name: player.into(),
        opponent_name: opponent.into(),
    }
}

fn host_with(transport: impl Transport + 'static) -> Session {
    Session::new(
        Role::Host,
        names("host", "guest"),
        quiet_config(),
        Box::new(transport),
        7,
    )
    .expect("valid config")
}

fn guest_with(transport: impl Transport + 'static) -> Session {
    Session::new(
        Role::Guest,
        names("guest", "host"),
        quiet_config(),
        Box::new(transport),
        8,
    )
    .expect("valid config")
}

fn direct_sessions() -> (Session, Session) {
    let (a, b) = DirectTransport::pair();
    (host_with(a), guest_with(b))
}

/// Records everything sent; hands out whatever the test queued in `inbox`
#[derive(Clone, Default)]
struct Recorder {
    sent: Rc<RefCell<Vec<PeerMessage>>>,
    inbox: Rc<RefCell<Vec<PeerMessage>>>,
    closed: Rc<Cell<bool>>,
}

impl Recorder {
    fn count(&self, pred: impl Fn(&PeerMessage) -> bool) -> usize {
        self.sent.borrow().iter().filter(|m| pred(m)).count()
    }
}

impl Transport for Recorder {
    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    fn send(&mut self, msg: &PeerMessage) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(msg.clone());
        Ok(())
    }

    fn drain(&mut self) -> Vec<PeerMessage> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    fn close(&mut self) {
        self.closed.set(true);
    }
}

#[test]
fn test_guest_mirrors_host_ball_and_score() {
    let (mut host, mut guest) = direct_sessions();
    host.begin(0);
    host.start();
    guest.start();

    for tick in 1..=30u64 {
        host.tick(0, tick * 16);
        guest.tick(0, tick * 16);

        assert_eq!(
            guest.game().engine().ball(),
            host.game().engine().ball(),
            "Guest ball follows the host on tick {tick}"
        );
        assert_eq!(guest.game().engine().score(), host.game().engine().score());
    }
}

#[test]
fn test_guest_takes_snapshot_verbatim() {
    let (mut remote, local) = DirectTransport::pair();
    let mut guest = guest_with(local);

    remote
        .send(&PeerMessage::BallState(BallState {
            x: 400.0,
            y: 300.0,
            vx: 2.0,
            vy: -2.0,
            speed: 1.0,
            size: 12.0,
        }))
        .expect("sent");
    guest.tick(0, 16);

    let ball = guest.game().engine().ball();
    assert_eq!(ball.pos, Vec2::new(400.0, 300.0));
    assert_eq!(ball.vel, Vec2::new(2.0, -2.0));

    // A later snapshot replaces the whole ball, nothing is merged
    remote
        .send(&PeerMessage::BallState(BallState {
            x: 10.0,
            y: 20.0,
            vx: -1.0,
            vy: 3.0,
            speed: 1.5,
            size: 8.0,
        }))
        .expect("sent");
    guest.tick(0, 32);

    let ball = guest.game().engine().ball();
    assert_eq!(ball.pos, Vec2::new(10.0, 20.0));
    assert_eq!(ball.vel, Vec2::new(-1.0, 3.0));
    assert_eq!(ball.speed, 1.5);
    assert_eq!(ball.size, 8.0);
}

#[test]
fn test_paddle_moves_cross_over() {
    let (mut host, mut guest) = direct_sessions();

    guest.tick(-1, 16);
    host.tick(0, 16);

    let guest_x = guest.game().engine().paddle(Side::Bottom).x;
    assert_eq!(guest_x, 342.0);
    assert_eq!(host.game().engine().paddle(Side::Bottom).x, guest_x);

    host.tick(1, 32);
    guest.tick(0, 32);
    assert_eq!(guest.game().engine().paddle(Side::Top).x, 358.0);
}

#[test]
fn test_remote_paddle_is_not_clamped_and_own_paddle_is_protected() {
    let (mut remote, local) = DirectTransport::pair();
    let mut host = host_with(local);

    remote
        .send(&PeerMessage::PaddleMove {
            player_number: 2,
            x: -50.0,
            direction: -1,
        })
        .expect("sent");
    remote
        .send(&PeerMessage::PaddleMove {
            player_number: 1,
            x: 10.0,
            direction: -1,
        })
        .expect("sent");
    host.tick(0, 16);

    assert_eq!(host.game().engine().paddle(Side::Bottom).x, -50.0);
    assert_eq!(
        host.game().engine().paddle(Side::Top).x,
        350.0,
        "Nobody else steers our paddle"
    );
}

#[test]
fn test_paddle_move_sent_only_on_change() {
    let recorder = Recorder::default();
    let mut host = host_with(recorder.clone());
    let is_move = |m: &PeerMessage| matches!(m, PeerMessage::PaddleMove { .. });

    host.tick(0, 16);
    assert_eq!(recorder.count(is_move), 0);

    host.tick(1, 32);
    host.tick(1, 48);
    assert_eq!(recorder.count(is_move), 2);

    // Pinned against the wall: no change, nothing sent
    for tick in 0..100 {
        host.tick(1, 64 + tick);
    }
    let moves = recorder.count(is_move);
    host.tick(1, 1000);
    assert_eq!(recorder.count(is_move), moves);

    host.tick(-1, 1016);
    assert_eq!(
        recorder.sent.borrow().iter().rev().find(|m| is_move(m)),
        Some(&PeerMessage::PaddleMove {
            player_number: 1,
            x: 692.0,
            direction: -1,
        })
    );
}

#[test]
fn test_host_publishes_score_every_tick_and_game_over_once() {
    let recorder = Recorder::default();
    let mut host = host_with(recorder.clone());

    host.tick(0, 16);
    assert_eq!(
        recorder.count(|m| matches!(m, PeerMessage::BallState(_))),
        0,
        "No ball state before play starts"
    );

    let engine = host.game_mut().engine_mut();
    engine.set_scores(4, 0);
    engine.start();
    let mut ball = engine.ball();
    ball.pos = Vec2::new(100.0, 599.0);
    ball.vel = Vec2::new(0.0, 2.0);
    engine.apply_ball_snapshot(ball);

    for tick in 2..=7u64 {
        host.tick(0, tick * 16);
    }

    assert_eq!(host.game().engine().state(), GameState::GameOver);
    assert_eq!(recorder.count(|m| matches!(m, PeerMessage::Score { .. })), 7);
    assert_eq!(
        recorder.count(|m| matches!(m, PeerMessage::GameOver { .. })),
        1,
        "Game over goes out exactly once"
    );
    assert!(recorder
        .sent
        .borrow()
        .contains(&PeerMessage::GameOver { winner: 1 }));
    assert_eq!(
        recorder.sent.borrow().last(),
        Some(&PeerMessage::Score {
            score1: 5,
            score2: 0
        })
    );
}

#[test]
fn test_guest_reports_result_from_host_game_over() {
    let board = Rc::new(RefCell::new(Leaderboard::new()));
    let recorder = Recorder::default();
    let mut guest = guest_with(recorder.clone()).with_reporter(board.clone());

    recorder.inbox.borrow_mut().extend([
        PeerMessage::Score {
            score1: 2,
            score2: 5,
        },
        PeerMessage::GameOver { winner: 2 },
        PeerMessage::GameOver { winner: 2 },
    ]);
    guest.tick(0, 16);
    guest.tick(0, 32);

    let engine = guest.game().engine();
    assert_eq!(engine.state(), GameState::GameOver);
    assert_eq!(engine.winner(), Some(Side::Bottom));

    let board = board.borrow();
    let stats = board.player("guest").expect("recorded");
    assert_eq!(stats.games_played, 1, "Repeated game over is idempotent");
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.best_score, 5);
    assert_eq!(stats.game_modes["online"].games, 1);
    assert!(board.player("host").is_none(), "Only the local side is reported");
}

#[test]
fn test_host_ignores_foreign_ball_score_and_game_over() {
    let (mut remote, local) = DirectTransport::pair();
    let mut host = host_with(local);
    let (_control_remote, control_local) = DirectTransport::pair();
    let mut control = host_with(control_local);
    for session in [&mut host, &mut control] {
        session.start();
        session.tick(0, 16);
    }

    for msg in [
        PeerMessage::BallState(BallState {
            x: 10.0,
            y: 10.0,
            vx: -3.0,
            vy: -3.0,
            speed: 3.0,
            size: 4.0,
        }),
        PeerMessage::Score {
            score1: 4,
            score2: 4,
        },
        PeerMessage::GameOver { winner: 2 },
    ] {
        remote.send(&msg).expect("sent");
    }
    host.tick(0, 32);
    control.tick(0, 32);

    let (h, c) = (host.game().engine(), control.game().engine());
    assert_eq!(h.get_state(), c.get_state(), "Host state matches an untouched host");
    assert_eq!(h.state(), GameState::Playing);
    assert_eq!(h.winner(), None);
    assert_eq!((h.score().score1, h.score().score2), (0, 0));
    assert_ne!(h.ball().pos, Vec2::new(10.0, 10.0));
}

#[test]
fn test_restart_resets_both_peers() {
    let (mut host, mut guest) = direct_sessions();
    host.game_mut().engine_mut().set_scores(3, 2);
    host.tick(0, 16);
    guest.tick(0, 16);
    assert_eq!(guest.game().engine().score().score1, 3);

    assert!(!guest.request_restart(), "Guests cannot restart");
    assert!(host.request_restart());

    host.tick(0, 32);
    guest.tick(0, 32);

    for session in [&host, &guest] {
        let engine = session.game().engine();
        assert_eq!(engine.get_state().score1, 0);
        assert_eq!(engine.get_state().score2, 0);
        assert_eq!(engine.state(), GameState::Ready);
    }
}

#[test]
fn test_opponent_disconnect_pauses_and_ends_session() {
    let (mut host, mut guest) = direct_sessions();
    host.start();
    guest.start();
    host.tick(0, 16);

    host.leave();
    assert!(!host.is_active());

    guest.tick(0, 32);
    assert!(!guest.is_active());
    assert_eq!(guest.game().engine().state(), GameState::Paused);
    assert!(!guest.game().spawner().is_running());

    // Further ticks are inert
    let before = guest.game().engine().get_state();
    guest.tick(1, 48);
    assert_eq!(guest.game().engine().get_state(), before);
}

#[test]
fn test_leave_closes_transport() {
    let recorder = Recorder::default();
    let mut guest = guest_with(recorder.clone());
    guest.leave();
    assert!(recorder.closed.get());
}

#[test]
fn test_malformed_messages_are_ignored() {
    let (mut remote, local) = DirectTransport::pair();
    let mut guest = guest_with(local);
    let before = guest.game().engine().get_state();

    for msg in [
        PeerMessage::PaddleMove {
            player_number: 1,
            x: f32::NAN,
            direction: 1,
        },
        PeerMessage::PaddleMove {
            player_number: 9,
            x: 5.0,
            direction: 1,
        },
        PeerMessage::BallState(BallState {
            x: f32::INFINITY,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            speed: 1.0,
            size: 12.0,
        }),
        PeerMessage::GameOver { winner: 7 },
        PeerMessage::Score {
            score1: 1,
            score2: 0,
        },
    ] {
        remote.send(&msg).expect("sent");
    }
    guest.tick(0, 16);

    let after = guest.game().engine().get_state();
    assert_eq!(after.paddle1, before.paddle1);
    assert_eq!(after.ball, before.ball);
    assert_eq!(after.state, GameState::Ready);
    assert_eq!((after.score1, after.score2), (1, 0), "Valid message still lands");
}

#[test]
fn test_sessions_over_relay() {
    let hub = RelayHub::shared();
    let host_link = RelayTransport::connect(&hub);
    let guest_link = RelayTransport::connect(&hub);

    let code = hub.borrow().registry().fresh_code(&mut game_core::GameRng::new(3));
    let host_number = host_link.create_room(&code).expect("created");
    let guest_number = guest_link.join_room(&code).expect("joined");
    assert_eq!(Role::from_player_number(host_number), Some(Role::Host));
    assert_eq!(Role::from_player_number(guest_number), Some(Role::Guest));
    assert!(host_link.take_game_ready().is_some());

    let mut host = host_with(host_link);
    let mut guest = guest_with(guest_link);
    assert_eq!(host.transport_kind(), TransportKind::Relay);
    host.begin(0);
    host.start();

    for tick in 1..=10u64 {
        host.tick(1, tick * 16);
        guest.tick(-1, tick * 16);
    }
    host.tick(0, 176);
    guest.tick(0, 176);

    let (h, g) = (host.game().engine(), guest.game().engine());
    assert_eq!(g.ball(), h.ball());
    assert_eq!(g.paddle(Side::Top).x, h.paddle(Side::Top).x);
    assert_eq!(h.paddle(Side::Bottom).x, g.paddle(Side::Bottom).x);
    assert_eq!(h.paddle(Side::Top).x, 430.0);
    assert_eq!(g.paddle(Side::Bottom).x, 270.0);

    // Dropping the host tears down its connection
    drop(host);
    guest.tick(0, 192);
    assert!(!guest.is_active());
    let room = hub.borrow().registry().room(&code).cloned().expect("guest remains");
    assert_eq!(room.status, RoomStatus::Waiting);
}
