// SPDX-License-Identifier: AGPL-3.0-or-later

//! Utilities and fixtures for the test suite.
pub mod fixtures;
