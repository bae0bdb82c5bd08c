mod protocol_tests;
mod synthesis_tests;
