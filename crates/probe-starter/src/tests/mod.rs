//! Test suites for the probe starter.

mod support;
