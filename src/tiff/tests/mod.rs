mod decode_tests;
