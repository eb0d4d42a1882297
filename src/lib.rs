// Synapse Host - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod config;
pub mod session;
pub mod ui;

// ============================================================================
// TOOL EXECUTION: registry, gate, sandboxed implementations
// ============================================================================

pub mod dispatch;
pub mod gate;
pub mod registry;
pub mod tools;

// ============================================================================
// SESSION PROTOCOL: frames, routing, connection lifecycle
// ============================================================================

pub mod client;
pub mod protocol;
pub mod router;
