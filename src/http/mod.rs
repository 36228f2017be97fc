//! HTTP routes of the responder.
//!
//! Every route answers 200 with a plain-text body chosen by path alone.

pub mod handlers;
