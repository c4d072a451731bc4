pub mod glue;
pub mod init;

pub use glue::{glue, GlueArgs};
pub use init::{init, InitArgs};
