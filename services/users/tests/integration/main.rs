mod helpers;

mod serialize_test;
