// TuneSift - lib.rs
//
// Library entry point, exposing every layer for integration testing and
// programmatic use. The `tunesift` binary in `main.rs` is a thin CLI over
// `app::pipeline`.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
