//! Core library for MemoryMap.
//!
//! Everything a MemoryMap front end needs apart from drawing: the typed
//! client for the diary backend, the local persisted store (auth token and
//! favorite quotes), analytics, emotion tagging, filtering and the per-page
//! state containers.

pub mod analytics;
pub mod api;
pub mod config;
pub mod emotion_map;
pub mod error;
pub mod filter;
pub mod model;
pub mod pages;
pub mod routes;
pub mod store;
pub mod tagging;
pub mod view;
