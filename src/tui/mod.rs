// Interactive front end: state in `types`, input and async plumbing in `handlers`.
// Rendering and the event loop live in `commands::tui`.

pub mod handlers;
pub mod types;
