//! MCP tool server over stdio

mod server;
pub use server::{CalendarServer, serve};
