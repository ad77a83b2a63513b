//! Infrastructure layer - persistence implementations, loaders

pub mod persistence;
pub mod unit_price_loader;
