//! SSH connectivity: transport, host key verification, and the
//! per-site session used for listing and pulling albums.

mod client;
mod error;
pub mod known_hosts;
mod session;

pub use client::{ClientHandler, Endpoint};
pub use error::SshError;
pub use known_hosts::{get_known_hosts, HostKeyCheck, KnownHostsStore};
pub use session::{CredentialPrompt, RemoteSession};
