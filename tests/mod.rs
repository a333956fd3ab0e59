//! Test suite for StudyHub
//!
//! This module organizes all tests

pub mod common;
