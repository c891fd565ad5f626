mod filter_options_tests;
mod properties_tests;
