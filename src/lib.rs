//! This crate serves purely as an rest api abstraction for a small lab
//! submission checking server. Additionally there is a canonical server
//! implementation in the same repository.
//!
//! The server fronts a directory tree of student submissions and a set of
//! per-lab checker scripts. On request it runs the matching checker against
//! each selected student's data file, saves the output next to the
//! submission and streams it back while the checkers are still running.
//!
//! ## Usage
//! For the complete payload formats, see the serde structs in [`api`].
//! * `GET /` lists the labs as an [`api::LabsResponse`].
//! * `GET /check/{lab}` lists one lab's students as an
//!   [`api::StudentsResponse`].
//! * `POST /run_check/{lab}` runs the lab's checker for the selected
//!   students ([`api::RunChecksRequest`]) and answers with a chunked
//!   `text/plain` stream of the combined checker output.
//!
//! ## Streamed responses
//! The run route answers while the checkers execute, strictly one student
//! at a time. Every output line is forwarded as soon as the checker prints
//! it, framed by a banner line for the lab, a banner line per student and
//! one final line once the whole run is through. The same output is
//! persisted server side as a `result.txt` next to each student's input
//! file, so a dropped connection loses nothing.
//!
//! ## Long running checks
//! There is no timeout around a checker process. *Make sure your checkers
//! always terminate*, otherwise the request hangs for as long as the stuck
//! checker lives.
//!
//! ## Security
//! The api does not include any security measures. Keep the server on a
//! teacher's machine or an internal network, not on the open internet.

pub mod api;
