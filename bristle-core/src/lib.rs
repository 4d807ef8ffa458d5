//! Core bristle-brush stroke simulation library.
//!
//! Main components:
//! - [`bristle`] — a single strand dragged as a chain of rigid links.
//! - [`brush`] — the bristle ensemble, its travel direction and anchors.
//! - [`trace`] — one stroke: color precompute with wet mixing, then painting.
//! - [`canvas`] — pixel buffer and the read/draw traits the stroke uses.
//! - [`color`] — RGBA and HSB paint colors.
//! - [`noise`] — seeded coherent noise.
//! - [`context`] — owned RNG and noise state for one simulation.
//! - [`path`] — random-walk stroke paths.
//! - [`sketch`] — painting random strokes onto a canvas.
//! - [`config`] — tunables for the brush, the trace and the sketch.
//! - [`error`] — error types.
//! - [`types`] — shared type aliases and IDs.

pub mod bristle;
pub mod brush;
pub mod canvas;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod noise;
pub mod path;
pub mod sketch;
pub mod trace;
pub mod types;
