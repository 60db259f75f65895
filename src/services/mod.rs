/// Scheduled daily poll broadcast
pub mod broadcast;
