pub mod association;
pub mod cascade;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod response;
pub mod routes;
pub mod store;
