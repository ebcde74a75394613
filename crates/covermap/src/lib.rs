//! Store coverage map for a virtual guard dashboard.
//!
//! [`map::CoverageMap`] is the embeddable egui widget. Everything it draws
//! comes from a [`zone::ZoneModel`] turned into an ordered
//! [`scene::Scene`], which the egui painter and the SVG exporter share.

pub mod display;
pub mod geometry;
pub mod hover;
pub mod map;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod theme;
pub mod zone;
