//! View layer. Produces draw instances for a GPU backend; it never talks to
//! a windowing system itself.

pub mod diff;
