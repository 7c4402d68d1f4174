//! UseCase layer: the operations the connection handlers and the admin API drive.

mod connect_participant;
mod disconnect_participant;
mod error;
mod get_session_state;
mod send_message;

pub use connect_participant::{Admission, ConnectParticipantUseCase};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::ConnectError;
pub use get_session_state::{GetSessionStateUseCase, SessionState};
pub use send_message::{BroadcastReport, SendMessageUseCase};
