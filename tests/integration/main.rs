//! Integration tests for the catalog and the scrape pipeline
//!
//! These tests use wiremock to stand in for the profile site and run whole
//! `Catalog::add` / `save` / `load` cycles against temporary storage roots.

mod catalog_tests;
mod support;
