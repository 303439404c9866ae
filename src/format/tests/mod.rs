//! Unit tests for annotation file import and export.
//!
//! These tests verify record validation, whole-file error handling and
//! export/import round trips.
