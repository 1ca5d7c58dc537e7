//! Clipshelf API service
//!
//! A small video-hosting backend: authenticated users upload a video file
//! and a thumbnail image; the bytes land on local disk or in S3 behind the
//! [`storage::MediaStore`] trait, and the metadata lands in PostgreSQL.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod storage;
pub mod uploads;
pub mod validation;
