mod helpers;

mod block_tests;
