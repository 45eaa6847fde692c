pub mod alloc;
pub mod config;
pub mod error;
pub mod kmer;
pub mod search;
pub mod sets;
pub mod statistics;
