#![allow(clippy::type_complexity)]

pub mod board;
pub mod bot;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod games;
pub mod learning;
pub mod messages;
pub mod persistence;
pub mod policy;
pub mod q_table;
pub mod session;
pub mod training;
pub mod transport;
pub mod utils;

pub use error::{Error, Result};
