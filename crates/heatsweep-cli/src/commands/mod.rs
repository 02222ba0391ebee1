pub(crate) mod config;
pub(crate) mod grid;
pub(crate) mod sweep;
