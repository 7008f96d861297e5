
mod transport_tests;
