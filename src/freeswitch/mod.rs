pub mod connection;
pub mod protocol;
pub mod types;

pub use connection::Connection;
pub use protocol::Headers;
