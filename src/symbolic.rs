pub mod expression;
pub mod latex_input;
pub mod parse_expr;
pub mod symbolic_engine;
pub mod symbolic_integration;
