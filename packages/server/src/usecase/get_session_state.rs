//! UseCase: read-only view of the session for the admin API and tests.

use std::sync::Arc;

use crate::{
    domain::{ChatLine, Member},
    infrastructure::{HistoryLog, SessionRegistry},
};

/// Point-in-time session summary
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Live members in join order
    pub members: Vec<Member>,
    pub history_len: usize,
}

pub struct GetSessionStateUseCase {
    registry: Arc<SessionRegistry>,
    history: Arc<HistoryLog>,
}

impl GetSessionStateUseCase {
    pub fn new(registry: Arc<SessionRegistry>, history: Arc<HistoryLog>) -> Self {
        Self { registry, history }
    }

    pub async fn execute(&self) -> SessionState {
        let history_len = self.history.len().await;
        let members = self.registry.snapshot().await.members().to_vec();
        SessionState {
            members,
            history_len,
        }
    }

    pub async fn history(&self) -> Vec<ChatLine> {
        self.history.lines().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, MockTranscriptStore, PusherChannel, Timestamp};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_session_state_reports_members_and_history() {
        // Test: the summary reflects registry members and history length
        // given (preconditions):
        let registry = Arc::new(SessionRegistry::new());
        let history = Arc::new(HistoryLog::new(Arc::new(MockTranscriptStore::new())));
        let (tx, _rx) = mpsc::channel(1);
        registry
            .join(Member::new(
                ConnectionId::new(3),
                "127.0.0.1:5000".parse().unwrap(),
                Timestamp::new(0),
                PusherChannel::new(tx, CancellationToken::new()),
            ))
            .await
            .unwrap();
        history.append(ChatLine::from_record("alice: hi")).await;
        let usecase = GetSessionStateUseCase::new(registry, history);

        // when (action):
        let state = usecase.execute().await;

        // then (expected):
        assert_eq!(state.members.len(), 1);
        assert_eq!(state.members[0].id, ConnectionId::new(3));
        assert_eq!(state.history_len, 1);
        assert_eq!(
            usecase.history().await,
            vec![ChatLine::from_record("alice: hi")]
        );
    }
}
