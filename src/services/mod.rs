pub mod challenges;
pub mod notify;
pub mod recompute;
pub mod server;
