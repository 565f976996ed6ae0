/// Defines the data structures for log records.
pub mod logrecord;
/// Implements a local logger with support for TTY, file and in-memory output.
pub mod loggerlocal;
