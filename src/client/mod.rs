//! # client
//!
//! Share client

// -- components

mod credentials;
mod dir;
mod options;
mod session;
mod share;
mod stream;
mod transfer;

pub use credentials::ShareCredentials;
pub use options::ShareOptions;
pub use session::{ConnectionSession, SessionState};
pub use share::ShareClient;
pub use stream::{ReadStream, WriteStream};
