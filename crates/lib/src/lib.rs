//! airbot core library: LINE webhook gateway, region resolution, air-quality lookup, and
//! reply cards. Used by the `airbot` CLI.

pub mod air_quality;
pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod pipeline;
pub mod region;
pub mod reply;
