/// Transport seam: poll/message delivery and outcome classification
pub mod delivery;
/// Update handlers and dispatch schema
pub mod handlers;
