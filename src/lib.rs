//! sol-hunter - Solana pair scanner library
//!
//! Scores DexScreener Solana pairs, ranks candidates in Redis, and serves
//! them through a small read API.
//!
//! # Modules
//!
//! - `domain`: Normalization, scoring, candidate cards
//! - `ports`: Trait abstractions (PairSource, CandidateStore)
//! - `adapters`: External implementations (DexScreener, Redis, HTTP, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Feed loop, store writer, query service

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
