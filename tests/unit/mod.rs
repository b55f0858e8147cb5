mod basic_tests;
mod tool_flow;
