//! A library containing the base chain contract interfaces consumed by the rollup node.

pub mod abi;
