//! Shared test harness modules for the sitescreen CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod export_unit;
mod helpers;
mod score_unit;
mod steps;
