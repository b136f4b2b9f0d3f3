pub mod use_cases;

pub use use_cases::export::ExportUseCase;
pub use use_cases::generate_tests::GenerateTestsUseCase;
pub use use_cases::log_results::LogResultsUseCase;
