//! forum-web - Server-rendered web client for a REST forum API
//!
//! This library provides the pages, services and backend gateway of the
//! forum client. The forum data itself lives behind the backend API.

pub mod backend;
pub mod config;
pub mod models;
pub mod services;
pub mod web;
