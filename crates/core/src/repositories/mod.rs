//! Repository management modules.
//!
//! This module contains the services that own persisted catalog data.

pub mod products;
