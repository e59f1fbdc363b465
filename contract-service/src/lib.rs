//! Contract Service - content hashing and tamper detection for contracts.

pub mod config;
pub mod models;
pub mod services;
pub mod startup;
