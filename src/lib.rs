// src/lib.rs

//! Substitution plan relay library

pub mod channel;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
