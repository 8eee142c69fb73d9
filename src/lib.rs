// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) wires these modules together into one sequential run.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with GitLab (project lookup,
//   existence check, create/update file) behind typed response variants.
// - `cli`: Command-line parsing and the usage text shown when no token
//   can be resolved.
// - `config`: Static remote-target constants and one-shot resolution of
//   run settings (token sources, .env file handling).
// - `entries`: The fixed ordered table of configuration files to push.
// - `sync`: The run loop: project resolution, per-file upserts, reporting.
//
// Keeping this separation makes it easy to exercise the run loop against
// an in-memory file store in tests, with the GitLab client as the only
// networked implementation.
pub mod api;
pub mod cli;
pub mod config;
pub mod entries;
pub mod sync;
