//! End-to-end deploy tests through the public facade.
//!
//! Two in-process nodes: the sender runs the deploy task, the receiver
//! decodes every chunk from its wire form and appends it to a file.

mod config_file;
mod loopback;
