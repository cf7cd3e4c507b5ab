pub mod session;
pub mod token_store;

pub use session::{Session, SessionManager};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
