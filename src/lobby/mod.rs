//! Session lifecycle: id generation, live rooms and the registry

pub mod id;
pub mod registry;
pub mod room;
