pub mod backoff;
pub mod broker;
pub mod consumer;
pub mod db;
pub mod entities;
