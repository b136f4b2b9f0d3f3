pub mod export;
pub mod generate_tests;
pub mod log_results;
pub mod model_fallback;
pub mod normalizer;
pub mod prompt_builder;
