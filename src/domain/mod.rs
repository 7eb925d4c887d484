//! Domain core: products, merchants, orders, shipment records

pub mod merchant;
pub mod order;
pub mod product;
pub mod shipment;
