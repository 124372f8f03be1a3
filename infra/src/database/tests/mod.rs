mod error_mapping_tests;
