// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod Utils;
pub mod calculus;
pub mod config;
pub mod determinants;
pub mod error_analysis;
pub mod errors;
pub mod matrix_ops;
pub mod numeric;
pub mod reduce;
pub mod root_finding;
pub mod steps;
pub mod symbolic;
pub mod vectors;
