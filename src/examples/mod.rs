//! Worked bindings of the query engine to concrete item universes.

pub mod filesystem;

#[cfg(test)]
mod __tests__;
