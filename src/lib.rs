//! Client for the OLX price scanner API: a UI-agnostic controller plus a terminal surface.
pub mod client;
pub mod controller;
pub mod endpoints;
pub mod table;
pub mod terminal;
pub mod types;
pub mod ui;
