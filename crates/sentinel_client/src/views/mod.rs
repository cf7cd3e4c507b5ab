pub mod admin;
pub mod audit;
pub mod network;
pub mod overview;
pub mod security;

pub use admin::UserAdmin;
pub use audit::AuditTrail;
pub use network::{NetworkMonitor, NetworkSnapshot};
pub use security::SecurityTools;
