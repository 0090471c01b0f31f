//! Test suite for villagesync
//!
//! This module organizes all tests
