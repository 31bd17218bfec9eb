// handlers/protected/mod.rs - Dashboard handlers (gate-admitted sessions only)
//
// Every handler here extracts CurrentIdentity, which the gate attaches after
// verifying the session cookie and matching its role to the partition.

pub mod screens;

pub use screens::*;
