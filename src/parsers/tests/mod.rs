
mod text_tests;
