//! Integration tests for the plugin runtime.

mod helpers;

mod components_test;
mod first_party_test;
mod lifecycle_test;
mod pipeline_test;
