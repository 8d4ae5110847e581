use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::{CaptureError, CaptureResult};
use crate::models::{
    ActiveError, CaptureMode, DraftField, ExpenseDraft, ExpenseRecord, ExtractionResult,
    ExtractionSummary, StatusMessage,
};
use crate::services::catalog::find_scenario;
use crate::services::extraction::{ExtractionKind, ExtractionSimulator, ExtractionTicket};
use crate::services::validation::validate;
use crate::settings::Settings;
use crate::store::ExpenseStore;
use crate::utils::{camera_file_label, local_clock_hhmm, now_rfc3339};

const UPLOAD_MESSAGE: &str = "Processing receipt. OCR extraction in progress...";
const CAMERA_MESSAGE: &str = "Scanning receipt with camera...";
const EXTRACTED_MESSAGE: &str = "Receipt processed. Review auto-filled fields below.";
const REVIEW_MESSAGE: &str = "Review generated. Confirm submission to save the expense.";

/// Base state of a capture cycle. The error overlay is tracked separately and
/// can sit on top of any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    ChoosingCaptureMethod,
    AwaitingCameraCapture,
    Extracting,
    ReadyToReview,
    Reviewing,
    Confirmed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::Idle => "idle",
            Phase::ChoosingCaptureMethod => "choosing a capture method",
            Phase::AwaitingCameraCapture => "awaiting a camera capture",
            Phase::Extracting => "extracting",
            Phase::ReadyToReview => "ready to review",
            Phase::Reviewing => "reviewing",
            Phase::Confirmed => "confirmed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCompletion {
    pub ticket: ExtractionTicket,
    pub result: ExtractionResult,
}

/// The collaborator that shows the confirmation screen and moves on.
pub trait ConfirmationSink {
    fn expense_confirmed(&mut self, record: &ExpenseRecord);
}

/// One capture session. Owns the draft, the store and the single extraction
/// slot; dropping it releases any pending extraction timer.
pub struct CaptureWorkflow {
    mode: CaptureMode,
    phase: Phase,
    picker_return: Phase,
    draft: ExpenseDraft,
    receipt_file_name: String,
    status: Option<StatusMessage>,
    extraction_summary: Option<ExtractionSummary>,
    review: Option<ExpenseRecord>,
    active_error: Option<ActiveError>,
    store: ExpenseStore,
    simulator: ExtractionSimulator,
    completions_tx: UnboundedSender<ExtractionCompletion>,
    completions_rx: UnboundedReceiver<ExtractionCompletion>,
    confirmation_sink: Option<Box<dyn ConfirmationSink>>,
}

impl CaptureWorkflow {
    pub fn new(simulator: ExtractionSimulator) -> Self {
        let (completions_tx, completions_rx) = unbounded_channel();
        CaptureWorkflow {
            mode: CaptureMode::Scan,
            phase: Phase::Idle,
            picker_return: Phase::Idle,
            draft: ExpenseDraft::default(),
            receipt_file_name: String::new(),
            status: None,
            extraction_summary: None,
            review: None,
            active_error: None,
            store: ExpenseStore::new(),
            simulator,
            completions_tx,
            completions_rx,
            confirmation_sink: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(ExtractionSimulator::with_mock_catalog(settings.delays()))
    }

    pub fn with_confirmation_sink(mut self, sink: Box<dyn ConfirmationSink>) -> Self {
        self.confirmation_sink = Some(sink);
        self
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &ExpenseDraft {
        &self.draft
    }

    pub fn receipt_file_name(&self) -> &str {
        &self.receipt_file_name
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn extraction_summary(&self) -> Option<&ExtractionSummary> {
        self.extraction_summary.as_ref()
    }

    pub fn review_snapshot(&self) -> Option<&ExpenseRecord> {
        self.review.as_ref()
    }

    pub fn active_error(&self) -> Option<&ActiveError> {
        self.active_error.as_ref()
    }

    pub fn is_error_shown(&self) -> bool {
        self.active_error.is_some()
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Extracting
    }

    pub fn expenses(&self) -> &ExpenseStore {
        &self.store
    }

    /// Resets the whole capture cycle. No-op when `mode` is already active.
    pub fn select_mode(&mut self, mode: CaptureMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(from = %self.mode, to = %mode, "Capture mode changed");
        self.simulator.cancel_pending();
        self.mode = mode;
        self.phase = Phase::Idle;
        self.picker_return = Phase::Idle;
        self.draft.reset();
        self.receipt_file_name.clear();
        self.status = None;
        self.extraction_summary = None;
        self.review = None;
        self.active_error = None;
    }

    /// From `Extracting` this abandons the running extraction.
    pub fn open_capture_options(&mut self) -> CaptureResult<()> {
        self.require_mode(CaptureMode::Scan, "open capture options")?;
        match self.phase {
            Phase::Idle | Phase::ReadyToReview | Phase::Reviewing => {
                self.picker_return = self.phase;
            }
            Phase::Extracting => {
                self.simulator.cancel_pending();
                self.status = None;
                self.receipt_file_name.clear();
                self.picker_return = Phase::Idle;
            }
            phase => return Err(invalid("open capture options", phase)),
        }
        self.transition(Phase::ChoosingCaptureMethod);
        Ok(())
    }

    pub fn cancel_capture_options(&mut self) -> CaptureResult<()> {
        self.require_phase(Phase::ChoosingCaptureMethod, "cancel capture options")?;
        self.transition(self.picker_return);
        Ok(())
    }

    pub fn choose_upload(&mut self, file_name: &str) -> CaptureResult<ExtractionTicket> {
        self.require_phase(Phase::ChoosingCaptureMethod, "upload a receipt")?;
        Ok(self.begin_extraction(ExtractionKind::Upload, file_name.to_string(), UPLOAD_MESSAGE))
    }

    pub fn choose_camera(&mut self) -> CaptureResult<()> {
        self.require_phase(Phase::ChoosingCaptureMethod, "open the camera")?;
        self.transition(Phase::AwaitingCameraCapture);
        Ok(())
    }

    pub fn close_camera(&mut self) -> CaptureResult<()> {
        self.require_phase(Phase::AwaitingCameraCapture, "close the camera")?;
        self.transition(self.picker_return);
        Ok(())
    }

    pub fn capture_from_camera(&mut self) -> CaptureResult<ExtractionTicket> {
        self.require_phase(Phase::AwaitingCameraCapture, "capture from the camera")?;
        Ok(self.begin_extraction(ExtractionKind::Camera, camera_file_label(), CAMERA_MESSAGE))
    }

    fn begin_extraction(&mut self, kind: ExtractionKind, label: String, message: &str) -> ExtractionTicket {
        self.review = None;
        self.extraction_summary = None;
        self.active_error = None;
        self.receipt_file_name = label.clone();
        self.status = Some(StatusMessage::info(message));
        self.transition(Phase::Extracting);

        let tx = self.completions_tx.clone();
        self.simulator.start(kind, label, move |ticket, result| {
            let _ = tx.send(ExtractionCompletion { ticket, result });
        })
    }

    /// Waits for the next extraction completion. Pass it to
    /// [`apply_completion`](Self::apply_completion).
    pub async fn next_completion(&mut self) -> Option<ExtractionCompletion> {
        self.completions_rx.recv().await
    }

    pub fn try_next_completion(&mut self) -> Option<ExtractionCompletion> {
        self.completions_rx.try_recv().ok()
    }

    /// Applies a finished extraction. Returns false, leaving state untouched,
    /// when the completion belongs to a superseded or cancelled extraction.
    pub fn apply_completion(&mut self, completion: ExtractionCompletion) -> bool {
        if self.phase != Phase::Extracting || !self.simulator.finish(completion.ticket) {
            tracing::warn!(ticket = completion.ticket.id(), phase = %self.phase, "Discarding stale extraction result");
            return false;
        }
        tracing::info!(
            ticket = completion.ticket.id(),
            merchant = %completion.result.merchant,
            confidence = completion.result.confidence,
            "Extraction finished"
        );
        self.draft.fill_from_extraction(&completion.result);
        self.extraction_summary = Some(completion.result.summary());
        self.status = Some(StatusMessage::success(EXTRACTED_MESSAGE));
        self.transition(Phase::ReadyToReview);
        true
    }

    /// Editing after a review was generated discards that review, including
    /// while the picker or camera is open on top of it.
    pub fn edit_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.draft.set(field, value);
        if self.review.take().is_none() {
            return;
        }
        self.status = None;
        let back_to = if self.extraction_summary.is_some() {
            Phase::ReadyToReview
        } else {
            Phase::Idle
        };
        if self.phase == Phase::Reviewing {
            self.transition(back_to);
        } else if self.picker_return == Phase::Reviewing {
            self.picker_return = back_to;
        }
    }

    pub fn edit_field_named(&mut self, name: &str, value: impl Into<String>) -> CaptureResult<()> {
        let field: DraftField = name.parse()?;
        self.edit_field(field, value);
        Ok(())
    }

    /// Validates the draft and, on success, snapshots it for confirmation.
    /// A failed validation keeps the draft and publishes an error status.
    pub fn save(&mut self) -> CaptureResult<&ExpenseRecord> {
        match self.phase {
            Phase::Idle | Phase::ReadyToReview | Phase::Reviewing => {}
            phase => return Err(invalid("save", phase)),
        }

        let amount = match validate(&self.draft) {
            Ok(amount) => amount,
            Err(err) => {
                tracing::debug!(error = %err, "Draft failed validation");
                self.status = Some(StatusMessage::error(err.to_string()));
                return Err(err.into());
            }
        };

        let record = ExpenseRecord {
            id: uuid::Uuid::new_v4().to_string(),
            mode: self.mode,
            created_at: now_rfc3339(),
            receipt_file_name: self.receipt_file_name.clone(),
            merchant: self.draft.merchant.clone(),
            amount,
            date: self.draft.date.clone(),
            category: self.draft.category.clone(),
            payment_method: self.draft.payment_method.clone(),
            notes: self.draft.notes.clone(),
        };
        self.status = Some(StatusMessage::success(REVIEW_MESSAGE));
        self.transition(Phase::Reviewing);
        Ok(&*self.review.insert(record))
    }

    /// Only valid while `Reviewing`; any other phase is rejected without
    /// touching state.
    pub fn confirm(&mut self) -> CaptureResult<ExpenseRecord> {
        if self.phase != Phase::Reviewing {
            return Err(invalid("confirm", self.phase));
        }
        let record = self.review.take().ok_or(invalid("confirm", self.phase))?;

        self.store.append(record.clone());
        self.draft.reset();
        self.receipt_file_name.clear();
        self.extraction_summary = None;
        self.status = None;
        self.active_error = None;
        self.transition(Phase::Confirmed);

        tracing::info!(id = %record.id, mode = %record.mode, amount = %record.amount, "Expense confirmed");
        if let Some(sink) = self.confirmation_sink.as_mut() {
            sink.expense_confirmed(&record);
        }

        self.transition(Phase::Idle);
        self.picker_return = Phase::Idle;
        Ok(record)
    }

    /// Shows a simulated failure on top of the current phase. Data is never
    /// touched; a second trigger replaces the first.
    pub fn trigger_error(&mut self, scenario_id: &str) -> CaptureResult<&ActiveError> {
        let scenario =
            find_scenario(scenario_id).ok_or_else(|| CaptureError::UnknownScenario(scenario_id.to_string()))?;
        tracing::debug!(scenario = scenario.id, phase = %self.phase, "Simulated error shown");
        Ok(&*self.active_error.insert(ActiveError {
            scenario,
            timestamp: local_clock_hhmm(),
        }))
    }

    /// Returns false when no error was shown.
    pub fn dismiss_error(&mut self) -> bool {
        self.active_error.take().is_some()
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            tracing::debug!(from = %self.phase, to = %next, "Capture phase changed");
            self.phase = next;
        }
    }

    fn require_phase(&self, expected: Phase, action: &'static str) -> CaptureResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(invalid(action, self.phase))
        }
    }

    fn require_mode(&self, required: CaptureMode, action: &'static str) -> CaptureResult<()> {
        if self.mode == required {
            Ok(())
        } else {
            Err(CaptureError::ModeMismatch { action, required })
        }
    }
}

fn invalid(action: &'static str, phase: Phase) -> CaptureError {
    CaptureError::InvalidTransition { action, phase }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::error::ValidationError;
    use crate::models::StatusKind;
    use crate::services::extraction::{ExtractionDelays, ExtractionSource};

    /// Produces "Receipt 1", "Receipt 2", ... so each extraction is identifiable.
    struct CountingSource {
        produced: AtomicUsize,
    }

    impl ExtractionSource for CountingSource {
        fn produce(&self) -> ExtractionResult {
            let n = self.produced.fetch_add(1, Ordering::SeqCst) + 1;
            ExtractionResult {
                merchant: format!("Receipt {n}"),
                amount: "42.70".to_string(),
                date: "2024-05-01".to_string(),
                category: "Groceries".to_string(),
                payment_method: "Visa **** 2189".to_string(),
                notes: "Verify tip before saving.".to_string(),
                confidence: 0.9,
            }
        }
    }

    fn workflow() -> CaptureWorkflow {
        let source = CountingSource {
            produced: AtomicUsize::new(0),
        };
        CaptureWorkflow::new(ExtractionSimulator::new(Box::new(source), ExtractionDelays::default()))
    }

    fn fill_manual(workflow: &mut CaptureWorkflow, merchant: &str, amount: &str, date: &str) {
        workflow.edit_field(DraftField::Merchant, merchant);
        workflow.edit_field(DraftField::Amount, amount);
        workflow.edit_field(DraftField::Date, date);
    }

    #[test]
    fn manual_entry_saves_and_confirms() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");

        let review = workflow.save().unwrap();
        assert_eq!(review.amount, "9.99");
        assert_eq!(workflow.phase(), Phase::Reviewing);
        assert_eq!(workflow.status().unwrap().kind, StatusKind::Success);

        let record = workflow.confirm().unwrap();
        assert_eq!(record.mode, CaptureMode::Manual);
        assert_eq!(record.amount, "9.99");
        assert!(record.receipt_file_name.is_empty());

        assert_eq!(workflow.phase(), Phase::Idle);
        assert!(workflow.draft().is_blank());
        assert!(workflow.status().is_none());
        assert!(workflow.review_snapshot().is_none());
        assert_eq!(workflow.expenses().all(), &[record]);
    }

    #[test]
    fn failed_validation_keeps_the_draft() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "-5", "2024-01-01");
        workflow.edit_field(DraftField::Notes, "lunch");
        let before = workflow.draft().clone();

        let err = workflow.save().unwrap_err();
        assert_eq!(err, CaptureError::Validation(ValidationError::InvalidAmount("-5".to_string())));
        assert_eq!(workflow.draft(), &before);
        assert_eq!(workflow.phase(), Phase::Idle);

        let status = workflow.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Amount must be a positive number.");

        workflow.edit_field(DraftField::Merchant, "");
        assert!(matches!(
            workflow.save(),
            Err(CaptureError::Validation(ValidationError::MissingRequiredField(_)))
        ));
        assert_eq!(workflow.status().unwrap().text, "Merchant and date are required.");
    }

    #[test]
    fn confirm_outside_review_is_rejected() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");

        let err = workflow.confirm().unwrap_err();
        assert_eq!(
            err,
            CaptureError::InvalidTransition {
                action: "confirm",
                phase: Phase::Idle
            }
        );
        assert!(workflow.expenses().is_empty());
        assert_eq!(workflow.draft().merchant, "Cafe A");
    }

    #[test]
    fn editing_during_review_invalidates_it() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");
        workflow.save().unwrap();

        workflow.edit_field(DraftField::Amount, "12.505");
        assert_eq!(workflow.phase(), Phase::Idle);
        assert!(workflow.review_snapshot().is_none());
        assert!(workflow.confirm().is_err());

        assert_eq!(workflow.save().unwrap().amount, "12.51");
        assert_eq!(workflow.confirm().unwrap().amount, "12.51");
    }

    #[test]
    fn editing_under_the_picker_drops_the_review() {
        let mut workflow = workflow();
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");
        workflow.save().unwrap();

        workflow.open_capture_options().unwrap();
        workflow.edit_field(DraftField::Amount, "99.00");
        assert!(workflow.review_snapshot().is_none());
        workflow.cancel_capture_options().unwrap();

        assert_eq!(workflow.phase(), Phase::Idle);
        assert!(workflow.status().is_none());
        assert!(workflow.confirm().is_err());
        assert_eq!(workflow.save().unwrap().amount, "99.00");
        assert_eq!(workflow.confirm().unwrap().amount, "99.00");
    }

    #[tokio::test(start_paused = true)]
    async fn editing_under_the_camera_returns_to_ready_to_review() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("lunch.jpg").unwrap();
        let completion = workflow.next_completion().await.unwrap();
        workflow.apply_completion(completion);
        workflow.save().unwrap();

        workflow.open_capture_options().unwrap();
        workflow.choose_camera().unwrap();
        workflow.edit_field(DraftField::Notes, "Team lunch");
        workflow.close_camera().unwrap();

        assert_eq!(workflow.phase(), Phase::ReadyToReview);
        assert!(workflow.review_snapshot().is_none());
        assert!(workflow.confirm().is_err());
    }

    #[test]
    fn reopening_the_picker_without_edits_keeps_the_review() {
        let mut workflow = workflow();
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");
        workflow.save().unwrap();

        workflow.open_capture_options().unwrap();
        workflow.cancel_capture_options().unwrap();
        assert_eq!(workflow.phase(), Phase::Reviewing);
        assert_eq!(workflow.confirm().unwrap().amount, "9.99");
    }

    #[test]
    fn saving_twice_regenerates_the_review() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");

        let first = workflow.save().unwrap().id.clone();
        let second = workflow.save().unwrap().id.clone();
        assert_ne!(first, second);
        assert_eq!(workflow.phase(), Phase::Reviewing);
    }

    #[test]
    fn capture_options_need_scan_mode() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        assert_eq!(
            workflow.open_capture_options(),
            Err(CaptureError::ModeMismatch {
                action: "open capture options",
                required: CaptureMode::Scan
            })
        );
        assert!(workflow.choose_upload("receipt.jpg").is_err());
        assert_eq!(workflow.phase(), Phase::Idle);
    }

    #[test]
    fn picker_and_camera_can_be_dismissed() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        assert_eq!(workflow.phase(), Phase::ChoosingCaptureMethod);
        workflow.cancel_capture_options().unwrap();
        assert_eq!(workflow.phase(), Phase::Idle);

        workflow.open_capture_options().unwrap();
        workflow.choose_camera().unwrap();
        assert_eq!(workflow.phase(), Phase::AwaitingCameraCapture);
        assert!(workflow.choose_camera().is_err());
        workflow.close_camera().unwrap();
        assert_eq!(workflow.phase(), Phase::Idle);
    }

    #[test]
    fn select_same_mode_is_a_no_op() {
        let mut workflow = workflow();
        workflow.edit_field(DraftField::Merchant, "Cafe A");
        workflow.select_mode(CaptureMode::Scan);
        assert_eq!(workflow.draft().merchant, "Cafe A");

        workflow.select_mode(CaptureMode::Manual);
        assert!(workflow.draft().is_blank());
    }

    #[test]
    fn error_overlay_leaves_the_base_state_alone() {
        let mut workflow = workflow();
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");
        workflow.save().unwrap();

        assert_eq!(workflow.trigger_error("network").unwrap().scenario.title, "Network failure");
        assert_eq!(workflow.trigger_error("save").unwrap().scenario.id, "save");
        assert_eq!(workflow.active_error().unwrap().scenario.id, "save");
        assert_eq!(workflow.active_error().unwrap().timestamp.len(), 5);
        assert_eq!(workflow.phase(), Phase::Reviewing);

        assert!(workflow.dismiss_error());
        assert!(!workflow.dismiss_error());
        assert_eq!(workflow.phase(), Phase::Reviewing);
        assert!(workflow.review_snapshot().is_some());

        assert_eq!(
            workflow.trigger_error("disk").unwrap_err(),
            CaptureError::UnknownScenario("disk".to_string())
        );
        assert!(!workflow.is_error_shown());
    }

    #[test]
    fn unknown_field_names_are_rejected() {
        let mut workflow = workflow();
        assert!(workflow.edit_field_named("payment_method", "Cash").is_ok());
        assert_eq!(workflow.draft().payment_method, "Cash");
        assert_eq!(
            workflow.edit_field_named("tip", "2"),
            Err(CaptureError::UnknownField("tip".to_string()))
        );
    }

    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl ConfirmationSink for RecordingSink {
        fn expense_confirmed(&mut self, record: &ExpenseRecord) {
            self.0.borrow_mut().push(record.id.clone());
        }
    }

    #[test]
    fn confirmation_sink_sees_the_record() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut workflow = workflow().with_confirmation_sink(Box::new(RecordingSink(seen.clone())));
        workflow.select_mode(CaptureMode::Manual);
        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");
        workflow.save().unwrap();

        let record = workflow.confirm().unwrap();
        assert_eq!(*seen.borrow(), vec![record.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_fills_the_draft_when_extraction_finishes() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("lunch.jpg").unwrap();

        assert_eq!(workflow.phase(), Phase::Extracting);
        assert!(workflow.is_processing());
        assert_eq!(workflow.status().unwrap().kind, StatusKind::Info);
        assert_eq!(workflow.receipt_file_name(), "lunch.jpg");
        assert!(matches!(workflow.save(), Err(CaptureError::InvalidTransition { .. })));

        let completion = workflow.next_completion().await.unwrap();
        assert!(workflow.apply_completion(completion));

        assert_eq!(workflow.phase(), Phase::ReadyToReview);
        assert_eq!(workflow.draft().merchant, "Receipt 1");
        assert_eq!(workflow.extraction_summary().unwrap().category, "Groceries");
        assert_eq!(workflow.status().unwrap().kind, StatusKind::Success);

        workflow.save().unwrap();
        let record = workflow.confirm().unwrap();
        assert_eq!(record.mode, CaptureMode::Scan);
        assert_eq!(record.receipt_file_name, "lunch.jpg");
        assert!(workflow.extraction_summary().is_none());
        assert!(workflow.receipt_file_name().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn editing_a_scanned_review_returns_to_ready_to_review() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("lunch.jpg").unwrap();
        let completion = workflow.next_completion().await.unwrap();
        workflow.apply_completion(completion);
        workflow.save().unwrap();

        workflow.edit_field(DraftField::Category, "Entertainment");
        assert_eq!(workflow.phase(), Phase::ReadyToReview);
        assert!(workflow.review_snapshot().is_none());
        assert_eq!(workflow.draft().category, "Entertainment");
    }

    #[tokio::test(start_paused = true)]
    async fn camera_capture_uses_a_synthesized_label() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_camera().unwrap();
        workflow.capture_from_camera().unwrap();

        assert!(workflow.receipt_file_name().starts_with("CameraCapture-"));
        assert_eq!(workflow.status().unwrap().text, "Scanning receipt with camera...");

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(workflow.try_next_completion().is_none());

        let completion = workflow.next_completion().await.unwrap();
        assert!(workflow.apply_completion(completion));
        assert_eq!(workflow.phase(), Phase::ReadyToReview);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_mode_mid_extraction_discards_the_result() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("lunch.jpg").unwrap();
        workflow.select_mode(CaptureMode::Manual);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(workflow.try_next_completion().is_none());
        assert!(workflow.draft().is_blank());
        assert_eq!(workflow.phase(), Phase::Idle);
        assert!(workflow.receipt_file_name().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_capture_supersedes_the_first() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        let first = workflow.choose_upload("a.jpg").unwrap();

        workflow.open_capture_options().unwrap();
        let second = workflow.choose_upload("b.jpg").unwrap();
        assert_ne!(first, second);

        let completion = workflow.next_completion().await.unwrap();
        assert_eq!(completion.ticket, second);
        assert!(workflow.apply_completion(completion));
        assert_eq!(workflow.draft().merchant, "Receipt 2");
        assert_eq!(workflow.receipt_file_name(), "b.jpg");

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(workflow.try_next_completion().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reopening_the_picker_mid_extraction_forgets_the_receipt() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("a.jpg").unwrap();
        workflow.open_capture_options().unwrap();
        assert!(workflow.receipt_file_name().is_empty());
        workflow.cancel_capture_options().unwrap();
        assert_eq!(workflow.phase(), Phase::Idle);

        fill_manual(&mut workflow, "Cafe A", "9.99", "2024-01-01");
        let record = workflow.save().unwrap();
        assert!(record.receipt_file_name.is_empty());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(workflow.try_next_completion().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completions_are_inert() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("a.jpg").unwrap();
        let completion = workflow.next_completion().await.unwrap();
        let replay = completion.clone();
        assert!(workflow.apply_completion(completion));

        workflow.edit_field(DraftField::Merchant, "Corrected");
        assert!(!workflow.apply_completion(replay));
        assert_eq!(workflow.draft().merchant, "Corrected");
        assert_eq!(workflow.phase(), Phase::ReadyToReview);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_lands_under_an_error_overlay() {
        let mut workflow = workflow();
        workflow.open_capture_options().unwrap();
        workflow.choose_upload("a.jpg").unwrap();
        workflow.trigger_error("ocr").unwrap();

        let completion = workflow.next_completion().await.unwrap();
        assert!(workflow.apply_completion(completion));
        assert!(workflow.is_error_shown());

        workflow.dismiss_error();
        assert_eq!(workflow.phase(), Phase::ReadyToReview);
    }
}
