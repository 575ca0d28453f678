//! The four lifecycle operations. Each command takes the loaded
//! configuration and a [`Console`](crate::console::Console) to write through,
//! which keeps the commands testable without touching real stdio.

pub mod create;
pub mod install;
pub mod list;
pub mod tidy;
