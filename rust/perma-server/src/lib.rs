#![warn(missing_docs)]

//! The HTTP face of share access.
//!
//! A [ShareHandler] answers `GET <prefix><target>?via=<share>,<hop>,…` by
//! checking the presented chain with a [ShareGate](perma_share::ShareGate)
//! and, once access is proven, streaming the target blob as stored or, with
//! `assemble=1` through a transitive share, the contents of the file it
//! describes. Every denial looks the same to the caller: a `401` that is
//! never sent sooner than the configured floor. Malformed requests are
//! answered straight away with a `400`.
//!
//! The [Server] runs a [ShareHandler] behind a hyper HTTP/1.1 accept loop;
//! the `permad` binary wires it to a [FileSystemBlobStore](perma_storage::FileSystemBlobStore)
//! according to a [ServerConfig].

mod error;
pub use error::*;

mod config;
pub use config::*;

mod cli;
pub use cli::*;

mod request;
pub use request::*;

mod response;
pub use response::*;

mod serve;
pub use serve::*;

mod download;
pub use download::*;

mod handler;
pub use handler::*;

mod server;
pub use server::*;
