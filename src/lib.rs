//! Stockroom - inventory tracking service
//!
//! A DynamoDB-backed product inventory service with SNS low-stock
//! alerting, exposed over a small REST surface.

pub mod bootstrap;
pub mod config;
pub mod http;
pub mod inventory;
pub mod notify;
pub mod product;
pub mod store;
