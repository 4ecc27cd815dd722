// Domain layer: entities, the result envelope and ports. Adapters live under crate::adapters.

pub mod model;
pub mod ports;
pub mod result;
