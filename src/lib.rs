pub mod autopilot;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frame_loop;
pub mod levels;
pub mod ranking_store;
pub mod rng;
pub mod server_protocol;
pub mod server_utils;
pub mod types;
pub mod world;
