pub mod controller_tests;
