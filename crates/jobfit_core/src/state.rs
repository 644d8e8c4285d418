use crate::error::Notice;
use crate::model::{JobHandle, Page, ResultsTab, SubscriptionId};
use crate::reconcile::{ReconciledResult, StatusReconciler};
use crate::session::PersistedSession;
use crate::view_model::{AppViewModel, ProcessingView};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    page: Page,
    tab: ResultsTab,
    reconciler: StatusReconciler,
    job: Option<JobHandle>,
    stream: Option<SubscriptionId>,
    last_subscription: SubscriptionId,
    submitting: bool,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            page: self.page,
            tab: self.tab,
            notice: self.notice.as_ref().map(ToString::to_string),
            submitting: self.submitting,
            job_name: self.job.as_ref().map(|job| job.name.clone()),
            processing: ProcessingView::from_result(
                self.job.as_ref().map(|job| job.name.as_str()),
                self.reconciler.result(),
            ),
            result: self.reconciler.result().clone(),
            dirty: self.dirty,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    pub fn result(&self) -> &ReconciledResult {
        self.reconciler.result()
    }

    /// Currently open subscription, if any.
    pub fn open_stream(&self) -> Option<SubscriptionId> {
        self.stream
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn snapshot(&self) -> PersistedSession {
        let result = self.reconciler.result();
        PersistedSession {
            current_page: self.page,
            analysis_result: (!result.is_empty()).then(|| result.clone()),
            file_status: self.job.clone(),
        }
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        self.page = page;
        self.mark_dirty();
    }

    pub(crate) fn set_tab(&mut self, tab: ResultsTab) {
        self.tab = tab;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
        self.mark_dirty();
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
        self.mark_dirty();
    }

    pub(crate) fn reconciler_mut(&mut self) -> &mut StatusReconciler {
        &mut self.reconciler
    }

    /// Allocates a fresh id and records it as the open subscription.
    pub(crate) fn open_subscription(&mut self) -> SubscriptionId {
        self.last_subscription += 1;
        self.stream = Some(self.last_subscription);
        self.last_subscription
    }

    /// Forgets the open subscription, returning it so the caller can dispose it.
    pub(crate) fn take_subscription(&mut self) -> Option<SubscriptionId> {
        self.stream.take()
    }

    /// Starts tracking a newly created job from a clean slate.
    pub(crate) fn begin_job(&mut self, job: JobHandle) {
        self.reconciler = StatusReconciler::new();
        self.job = Some(job);
        self.tab = ResultsTab::default();
        self.notice = None;
        self.submitting = false;
        self.set_page(Page::Processing);
    }

    /// Loads a persisted session into a cold state.
    pub(crate) fn restore_from(&mut self, session: PersistedSession) {
        let completed = session.current_page == Page::Results;
        self.reconciler =
            StatusReconciler::restore(session.analysis_result.unwrap_or_default(), completed);
        self.job = session.file_status;
        self.set_page(session.current_page);
    }

    /// Drops all job state and returns to the input page.
    pub(crate) fn clear(&mut self) {
        self.reconciler = StatusReconciler::new();
        self.job = None;
        self.stream = None;
        self.submitting = false;
        self.notice = None;
        self.tab = ResultsTab::default();
        self.set_page(Page::Input);
    }
}
