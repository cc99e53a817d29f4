//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the aquarium node: the device
//! session state machine, the wire protocol, and the screen layouts.
//! All interaction with hardware and the server happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod identity;
pub mod messages;
pub mod ports;
pub mod screens;
pub mod session;
