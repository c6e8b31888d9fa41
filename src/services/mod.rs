pub mod analytics;
pub mod booking_service;
pub mod booking_store;
pub mod capacity;
pub mod operators;
