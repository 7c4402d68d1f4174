//! Shared state handed to every connection handler and admin route.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetSessionStateUseCase,
    SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_session_state_usecase: Arc<GetSessionStateUseCase>,
    /// Longest accepted inbound line, in bytes
    pub max_line_length: usize,
    /// How long a departing connection's writer may keep draining its queue
    pub drain_timeout: Duration,
}
