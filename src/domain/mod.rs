// Domain layer: core models and ports (interfaces). No external dependencies
// beyond the data-shape crates (serde, chrono, uuid, rust_decimal).

pub mod model;
pub mod ports;
