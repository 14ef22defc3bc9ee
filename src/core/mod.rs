// TuneSift - core/mod.rs
//
// Core business logic layer: profile mining, scoring, classification,
// review merging, and the data model they share.
// Must NOT depend on: platform, app, or any filesystem access.

pub mod classifier;
pub mod duration;
pub mod export;
pub mod history;
pub mod model;
pub mod profile;
pub mod review;
pub mod scorer;
pub mod text;
