//! WebSocket session loop and command dispatch.

pub mod dispatch;
pub mod session;
