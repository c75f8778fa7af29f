// Domain layer: wire models and ports. No HTTP client here.

pub mod model;
pub mod ports;
