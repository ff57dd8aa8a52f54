//! Networking: wire protocol, room fan-out and the WebTransport server

pub mod framing;
pub mod protocol;
pub mod rooms;
pub mod router;
pub mod tls;
pub mod transport;
pub mod validation;
