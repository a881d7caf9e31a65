// Domain layer: core records and the traits the pipeline is wired through.

pub mod model;
pub mod ports;
