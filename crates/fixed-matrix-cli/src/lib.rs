//! fixed-matrix-cli: a command line driver that exercises the `fixed-matrix`
//! API end to end.
pub mod demo;
