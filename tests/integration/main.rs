//! End-to-end tests driving the full router in-process.

mod calls_test;
mod events_test;
mod health_test;
mod helpers;
mod messaging_test;
mod stream_test;
