pub mod app;
#[cfg(unix)]
pub mod suite;
