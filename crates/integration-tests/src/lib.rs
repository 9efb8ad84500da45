//! End-to-end tests for the payables service live in `tests/`.
