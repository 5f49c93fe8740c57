// Domain layer: core models and ports (interfaces) of the check-and-notify pipeline.

pub mod model;
pub mod ports;
