mod manifest_tests;
mod pipeline_tests;
