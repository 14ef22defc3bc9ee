// TuneSift - app/mod.rs
//
// Application layer: orchestration and the I/O boundaries around the core
// (profile persistence, metadata lookup, review file exchange).
// Dependencies: core, platform, util.

pub mod pipeline;
pub mod profile_store;
pub mod provider;
pub mod review_io;
