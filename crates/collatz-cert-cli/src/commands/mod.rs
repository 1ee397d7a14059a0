pub mod avoidance;
pub mod certify;
pub mod gate_cycle;
pub mod tower;
