pub mod ast;
pub mod builtins;
pub mod evaluator;
pub mod fixtures;
pub mod lexer;
pub mod parser;
pub mod token;
