// src/lib.rs

//! Newswatch Library
//!
//! Watches news and press-release listing pages, extracts the newest item
//! of each site with declarative rules, and sends a webhook notification
//! when it changes.

pub mod document;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
