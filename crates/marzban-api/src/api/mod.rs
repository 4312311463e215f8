// Panel REST client
//
// `client` holds the transport mechanics; the remaining modules add the
// endpoint groups as inherent methods on `MarzbanClient`.

mod admin;
mod client;
mod node;
mod subscription;
mod system;
mod user;
mod xray;

pub use client::MarzbanClient;
