//! Concrete conversation partners shipped with chateval

mod remote;

pub use remote::RemoteChatAgent;
