pub mod discovery_tests;
