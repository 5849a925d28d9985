//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Hold list and editor state so front ends stay free of storage details.

pub mod list_view;
pub mod task_editor;
pub mod task_service;
