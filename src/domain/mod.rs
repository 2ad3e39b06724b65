// Domain layer: models and ports. Concrete engines live under `adapters`.
pub mod model;
pub mod ports;
