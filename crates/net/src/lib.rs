//! Network layer: TCP listener, per-connection reader/writer tasks, line
//! framing, and the ban list checked at admission.

pub mod ban;
pub mod conn;
pub mod line;
pub mod listener;

pub use ban::BanList;
pub use listener::run_listener;
