mod book_tests;
