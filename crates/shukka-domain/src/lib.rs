//! Domain layer: contracts, plan board, shipment ledger and daily report

pub mod model;
pub mod repository;
pub mod service;
