//! Per-connection session state machine.
//!
//! ```text
//! Connecting -> Connected <-> Joined(room)* -> Disconnected
//! ```
//!
//! `Disconnected` is terminal and reachable from every state. Closing happens
//! in two steps (`begin_close` then `finish_close`) so the realtime hub can
//! refuse new joins while it detaches the connection from its rooms.

use std::collections::BTreeSet;

use super::{
    error::SessionError,
    value_object::{ConnectionId, RoomId, Timestamp, UserId},
};

/// Observable phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Connected,
    /// Connected and joined to at least one room
    Joined,
    Disconnected,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Connecting => "Connecting",
            SessionPhase::Connected => "Connected",
            SessionPhase::Joined => "Joined",
            SessionPhase::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// One live connection's session
#[derive(Debug, Clone)]
pub struct Session {
    id: ConnectionId,
    user_id: UserId,
    lifecycle: Lifecycle,
    rooms: BTreeSet<RoomId>,
    connected_at: Option<Timestamp>,
}

impl Session {
    /// A session that has not completed its handshake yet
    pub fn new(id: ConnectionId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            lifecycle: Lifecycle::Connecting,
            rooms: BTreeSet::new(),
            connected_at: None,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn connected_at(&self) -> Option<Timestamp> {
        self.connected_at
    }

    pub fn rooms(&self) -> &BTreeSet<RoomId> {
        &self.rooms
    }

    pub fn phase(&self) -> SessionPhase {
        match self.lifecycle {
            Lifecycle::Connecting => SessionPhase::Connecting,
            Lifecycle::Open if self.rooms.is_empty() => SessionPhase::Connected,
            Lifecycle::Open => SessionPhase::Joined,
            Lifecycle::Closing | Lifecycle::Closed => SessionPhase::Disconnected,
        }
    }

    /// Whether the session still accepts joins and deliveries
    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Open
    }

    /// `Connecting -> Connected` on a successful handshake
    pub fn establish(&mut self, now: Timestamp) -> Result<(), SessionError> {
        if self.lifecycle != Lifecycle::Connecting {
            return Err(SessionError::InvalidTransition {
                from: self.phase().as_str(),
                to: SessionPhase::Connected.as_str(),
            });
        }
        self.lifecycle = Lifecycle::Open;
        self.connected_at = Some(now);
        Ok(())
    }

    /// `Connected/Joined -> Joined(room)`. Returns `false` if already joined.
    pub fn join(&mut self, room_id: RoomId) -> Result<bool, SessionError> {
        match self.lifecycle {
            Lifecycle::Open => Ok(self.rooms.insert(room_id)),
            Lifecycle::Connecting => Err(SessionError::InvalidTransition {
                from: SessionPhase::Connecting.as_str(),
                to: SessionPhase::Joined.as_str(),
            }),
            Lifecycle::Closing | Lifecycle::Closed => {
                Err(SessionError::Disconnected(self.id.to_string()))
            }
        }
    }

    /// `Joined(room) -> Connected` for that room. Returns `false` if not joined.
    pub fn leave(&mut self, room_id: &RoomId) -> bool {
        self.rooms.remove(room_id)
    }

    /// Stop accepting joins. Returns the rooms still joined at this point.
    pub fn begin_close(&mut self) -> BTreeSet<RoomId> {
        if self.lifecycle != Lifecycle::Closed {
            self.lifecycle = Lifecycle::Closing;
        }
        self.rooms.clone()
    }

    /// Enter the terminal state, dropping every remaining room.
    pub fn finish_close(&mut self) -> BTreeSet<RoomId> {
        self.lifecycle = Lifecycle::Closed;
        std::mem::take(&mut self.rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatId;

    fn session() -> Session {
        Session::new(
            ConnectionId::new("conn-1".to_string()).unwrap(),
            UserId::new("alice".to_string()).unwrap(),
        )
    }

    fn room(id: &str) -> RoomId {
        RoomId::from(ChatId::new(id.to_string()).unwrap())
    }

    #[test]
    fn test_session_walks_through_phases() {
        // テスト項目: Connecting -> Connected -> Joined -> Connected -> Disconnected
        // given (前提条件):
        let mut session = session();
        assert_eq!(session.phase(), SessionPhase::Connecting);

        // when / then:
        session.establish(Timestamp::now()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Connected);
        assert!(session.connected_at().is_some());

        assert!(session.join(room("c1")).unwrap());
        assert_eq!(session.phase(), SessionPhase::Joined);

        assert!(session.leave(&room("c1")));
        assert_eq!(session.phase(), SessionPhase::Connected);

        session.begin_close();
        session.finish_close();
        assert_eq!(session.phase(), SessionPhase::Disconnected);
    }

    #[test]
    fn test_join_is_idempotent() {
        // テスト項目: 同じルームへの再参加は変化を起こさない
        let mut session = session();
        session.establish(Timestamp::now()).unwrap();

        assert!(session.join(room("c1")).unwrap());
        assert!(!session.join(room("c1")).unwrap());
        assert_eq!(session.rooms().len(), 1);
    }

    #[test]
    fn test_join_before_handshake_fails() {
        // テスト項目: ハンドシェイク前の参加は不正な遷移
        let mut session = session();
        let result = session.join(room("c1"));
        assert_eq!(
            result,
            Err(SessionError::InvalidTransition {
                from: "Connecting",
                to: "Joined"
            })
        );
    }

    #[test]
    fn test_establish_twice_fails() {
        // テスト項目: 二重のハンドシェイクは拒否される
        let mut session = session();
        session.establish(Timestamp::now()).unwrap();
        assert!(session.establish(Timestamp::now()).is_err());
    }

    #[test]
    fn test_closing_session_refuses_joins_and_returns_rooms() {
        // テスト項目: 切断処理中は参加を拒否し、終了時に全ルームを返す
        // given (前提条件):
        let mut session = session();
        session.establish(Timestamp::now()).unwrap();
        session.join(room("c1")).unwrap();
        session.join(room("c2")).unwrap();

        // when (操作):
        let snapshot = session.begin_close();
        let join_result = session.join(room("c3"));
        let dropped = session.finish_close();

        // then (期待する結果):
        assert_eq!(snapshot.len(), 2);
        assert!(matches!(join_result, Err(SessionError::Disconnected(_))));
        assert_eq!(dropped, snapshot);
        assert!(session.rooms().is_empty());
        assert!(!session.is_live());
    }
}
