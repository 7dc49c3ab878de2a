//! Submission lifecycle and result ownership.
//!
//! The controller owns the visible client state: the current snapshot, the
//! current result, and the current error. Rendering and aggregation read
//! that state but never mutate it.
//!
//! Submissions race: the user may resubmit while an earlier exchange is
//! still in flight. Every dispatch is tagged with a monotonically
//! increasing sequence number and a completion is committed only when its
//! sequence number is the latest dispatched, so a slow earlier response
//! never overwrites a faster later one. Superseding is the only
//! cancellation mechanism; there is no explicit abort.

use crate::model::{ClientError, OptimizeResponse};
use crate::service::{OptimizeService, SubmitOptions};
use crate::snapshot::UploadSnapshot;

/// Lifecycle phase of the controller.
#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// No submission outstanding and nothing displayed yet.
    Idle,
    /// The latest dispatched submission has not completed.
    Submitting,
    /// The latest completed submission produced a result.
    Succeeded,
    /// The latest completed submission (or a capture) failed.
    Failed,
}

/// Everything a dispatched submission carries to the wire: its sequence
/// number, the snapshot copy it was committed against, and its options.
#[derive(Clone, Debug)]
pub struct PreparedSubmission {
    pub seq: u64,
    pub snapshot: UploadSnapshot,
    pub options: SubmitOptions,
}

/// Owner of the client's shared mutable state.
///
/// State transitions are synchronous methods; the asynchronous service
/// exchange happens between `begin_submission` and `complete`, outside any
/// borrow of the controller.
#[derive(Debug, Default)]
pub struct SubmissionController {
    next_seq: u64,
    /// Sequence number of the most recent dispatch, 0 when every dispatch
    /// has been invalidated (startup, or a snapshot change mid-flight).
    latest_dispatched: u64,
    in_flight: bool,
    snapshot: Option<UploadSnapshot>,
    result: Option<OptimizeResponse>,
    error: Option<ClientError>,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly captured snapshot.
    ///
    /// Wholly replaces the previous snapshot, clears any displayed result
    /// or error, and withdraws interest in every in-flight submission so a
    /// stale result is never shown against a different file.
    pub fn install_snapshot(&mut self, snapshot: UploadSnapshot) {
        self.snapshot = Some(snapshot);
        self.result = None;
        self.error = None;
        self.latest_dispatched = 0;
        self.in_flight = false;
    }

    /// Records a snapshot-capture failure.
    ///
    /// Sets the one visible error and clears any displayed result. The
    /// existing snapshot is deliberately left untouched.
    pub fn report_capture_failure(&mut self, err: ClientError) {
        self.result = None;
        self.error = Some(err);
    }

    /// Starts a submission against the current snapshot.
    ///
    /// Fails with `ClientError::Validation` when no snapshot is present;
    /// the caller must not issue any request in that case. On success the
    /// returned `PreparedSubmission` carries the snapshot copy and the
    /// sequence number to complete with.
    pub fn begin_submission(
        &mut self,
        options: SubmitOptions,
    ) -> Result<PreparedSubmission, ClientError> {
        let Some(snapshot) = self.snapshot.clone() else {
            let err = ClientError::Validation(
                "no file selected; upload a CSV or spreadsheet file first".to_string(),
            );
            self.result = None;
            self.error = Some(err.clone());
            return Err(err);
        };

        self.result = None;
        self.error = None;
        self.next_seq += 1;
        self.latest_dispatched = self.next_seq;
        self.in_flight = true;

        Ok(PreparedSubmission {
            seq: self.next_seq,
            snapshot,
            options,
        })
    }

    /// Commits the outcome of a dispatched submission.
    ///
    /// Returns `false` and changes nothing when `seq` is not the latest
    /// dispatched sequence number: that completion was superseded by a
    /// newer submission or snapshot. Otherwise installs exactly one of
    /// result or error and returns `true`.
    pub fn complete(
        &mut self,
        seq: u64,
        outcome: Result<OptimizeResponse, ClientError>,
    ) -> bool {
        if seq != self.latest_dispatched {
            return false;
        }
        self.in_flight = false;
        match outcome {
            Ok(response) => {
                self.result = Some(response);
                self.error = None;
            }
            Err(err) => {
                self.result = None;
                self.error = Some(err);
            }
        }
        true
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> SubmissionPhase {
        if self.in_flight {
            SubmissionPhase::Submitting
        } else if self.error.is_some() {
            SubmissionPhase::Failed
        } else if self.result.is_some() {
            SubmissionPhase::Succeeded
        } else {
            SubmissionPhase::Idle
        }
    }

    #[allow(dead_code)]
    pub fn snapshot(&self) -> Option<&UploadSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn current_result(&self) -> Option<&OptimizeResponse> {
        self.result.as_ref()
    }

    pub fn current_error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }
}

/// Drives one submission end to end: begin, exchange, complete.
///
/// Returns `true` when this submission's outcome was committed as the
/// visible state, `false` when a newer submission or snapshot superseded it
/// while it was in flight. A validation failure counts as committed: it is
/// the visible error and no request was sent.
pub async fn run_submission<S: OptimizeService>(
    controller: &tokio::sync::Mutex<SubmissionController>,
    service: &S,
    options: SubmitOptions,
) -> bool {
    let prepared = match controller.lock().await.begin_submission(options) {
        Ok(prepared) => prepared,
        Err(_) => return true,
    };

    let outcome = service.optimize(&prepared.snapshot, &prepared.options).await;
    controller.lock().await.complete(prepared.seq, outcome)
}
