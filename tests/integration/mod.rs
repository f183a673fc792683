//! Integration tests

pub mod batch_pipeline_tests;
pub mod strapi_client_tests;
pub mod validation_tests;
pub mod webhook_tests;
