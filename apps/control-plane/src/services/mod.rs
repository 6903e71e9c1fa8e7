// [apps/control-plane/src/services/mod.rs]
pub mod supervisor;
