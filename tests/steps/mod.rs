//! Step definitions for Cucumber behavioural tests.

mod status_steps;
