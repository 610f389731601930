// Domain layer: catalog, models and ports. No HTTP or filesystem code here.

pub mod catalog;
pub mod date;
pub mod model;
pub mod ports;
