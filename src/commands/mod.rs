pub mod exec;
pub mod init;
pub mod trigger;
