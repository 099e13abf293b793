pub mod client;
pub mod events;
pub mod verify;
pub mod webhook;
