//! Dashboard state: the note collection, the category filter and the
//! add/edit form.

use std::sync::{Arc, Mutex};

use crate::client::RemoteApi;
use crate::models::{filter_notes, Category, CategoryFilter, Note, NoteDraft, NoteId};

use super::{
    lock_state, ActionOutcome, Claim, Confirmation, Lifecycle, EMPTY_NOTES_MESSAGE,
    LOADING_NOTES_MESSAGE,
};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this note?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    LoadError,
}

/// The open add/edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub draft: NoteDraft,
    pub error: Option<String>,
    /// A submission is outstanding
    pub busy: bool,
    generation: u64,
}

impl NoteForm {
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        if self.draft.is_edit() {
            "Edit Note"
        } else {
            "Add Note"
        }
    }

    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        if self.draft.is_edit() {
            "Update Note"
        } else {
            "Save Note"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteListView {
    Loading,
    Empty,
    Notes(Vec<Note>),
}

impl NoteListView {
    /// Placeholder text shown instead of the list, if any.
    #[must_use]
    pub const fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_NOTES_MESSAGE),
            Self::Empty => Some(EMPTY_NOTES_MESSAGE),
            Self::Notes(_) => None,
        }
    }
}

/// Everything the dashboard screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub filter: CategoryFilter,
    pub error: Option<String>,
    pub list: NoteListView,
    pub form: Option<NoteForm>,
}

struct NotesState {
    mounted: bool,
    load: LoadState,
    notes: Vec<Note>,
    error: Option<String>,
    filter: CategoryFilter,
    form: Option<NoteForm>,
    form_generation: u64,
    refresh_in_flight: bool,
    refresh_requested: bool,
    deleting: Vec<NoteId>,
}

pub struct NotesViewModel<R: RemoteApi> {
    api: Arc<R>,
    state: Mutex<NotesState>,
    lifecycle: Lifecycle,
}

impl<R: RemoteApi> NotesViewModel<R> {
    pub fn new(api: Arc<R>) -> Self {
        Self {
            api,
            state: Mutex::new(NotesState {
                mounted: false,
                load: LoadState::Idle,
                notes: Vec::new(),
                error: None,
                filter: CategoryFilter::All,
                form: None,
                form_generation: 0,
                refresh_in_flight: false,
                refresh_requested: false,
                deleting: Vec::new(),
            }),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Initial load; later calls are skipped.
    pub async fn mount(&self) -> ActionOutcome {
        {
            let mut state = lock_state(&self.state);
            if state.mounted {
                return ActionOutcome::Skipped;
            }
            state.mounted = true;
        }
        self.refresh().await
    }

    /// Refetch the whole collection.
    ///
    /// While a fetch is running, further calls are folded into one follow-up
    /// fetch issued after it completes and return [`ActionOutcome::Skipped`].
    pub async fn refresh(&self) -> ActionOutcome {
        let previous_load = {
            let mut state = lock_state(&self.state);
            if state.refresh_in_flight {
                state.refresh_requested = true;
                return ActionOutcome::Skipped;
            }
            state.refresh_in_flight = true;
            state.load
        };
        let mut slot = Claim::new(&self.state, move |state: &mut NotesState| {
            state.refresh_in_flight = false;
            if state.load == LoadState::Loading {
                state.load = previous_load;
            }
        });

        loop {
            {
                let mut state = lock_state(&self.state);
                state.refresh_requested = false;
                state.load = LoadState::Loading;
            }

            let result = self.lifecycle.run(self.api.list_notes()).await;

            let Some(result) = result else {
                return ActionOutcome::Discarded;
            };
            let mut state = lock_state(&self.state);

            let outcome = match result {
                Ok(notes) => {
                    tracing::debug!(count = notes.len(), "Loaded notes");
                    state.notes = notes;
                    state.load = LoadState::Loaded;
                    state.error = None;
                    ActionOutcome::Completed
                }
                Err(error) => {
                    tracing::warn!("Failed to load notes: {}", error);
                    let message = error.user_message();
                    state.load = LoadState::LoadError;
                    state.error = Some(message.clone());
                    ActionOutcome::Failed(message)
                }
            };

            if !state.refresh_requested {
                state.refresh_in_flight = false;
                slot.disarm();
                return outcome;
            }
        }
    }

    /// Full refetch after a successful write.
    pub async fn resync(&self) -> ActionOutcome {
        tracing::debug!("Resyncing notes after write");
        self.refresh().await
    }

    pub fn set_filter(&self, filter: CategoryFilter) {
        lock_state(&self.state).filter = filter;
    }

    pub fn filter(&self) -> CategoryFilter {
        lock_state(&self.state).filter
    }

    pub fn load_state(&self) -> LoadState {
        lock_state(&self.state).load
    }

    pub fn error(&self) -> Option<String> {
        lock_state(&self.state).error.clone()
    }

    /// The whole collection, regardless of filter.
    pub fn notes(&self) -> Vec<Note> {
        lock_state(&self.state).notes.clone()
    }

    pub fn visible_notes(&self) -> Vec<Note> {
        let state = lock_state(&self.state);
        filter_notes(&state.notes, state.filter)
    }

    pub fn form(&self) -> Option<NoteForm> {
        lock_state(&self.state).form.clone()
    }

    pub fn open_add(&self) {
        self.open_form(NoteDraft::default());
    }

    /// Open the form on an existing note; `false` when the id is not loaded.
    pub fn open_edit(&self, id: &NoteId) -> bool {
        let draft = {
            let state = lock_state(&self.state);
            let Some(note) = state.notes.iter().find(|note| &note.id == id) else {
                return false;
            };
            NoteDraft::from_note(note)
        };
        self.open_form(draft);
        true
    }

    fn open_form(&self, draft: NoteDraft) {
        let mut state = lock_state(&self.state);
        state.form_generation += 1;
        let generation = state.form_generation;
        state.form = Some(NoteForm {
            draft,
            error: None,
            busy: false,
            generation,
        });
    }

    /// Apply `edit` to the open draft; `false` when no form is open.
    pub fn edit_draft(&self, edit: impl FnOnce(&mut NoteDraft)) -> bool {
        let mut state = lock_state(&self.state);
        let Some(form) = state.form.as_mut() else {
            return false;
        };
        edit(&mut form.draft);
        true
    }

    pub fn set_title(&self, title: impl Into<String>) -> bool {
        let title = title.into();
        self.edit_draft(|draft| draft.title = title)
    }

    pub fn set_content(&self, content: impl Into<String>) -> bool {
        let content = content.into();
        self.edit_draft(|draft| draft.content = content)
    }

    pub fn set_category(&self, category: Category) -> bool {
        self.edit_draft(|draft| draft.category = category)
    }

    pub fn cancel_form(&self) {
        lock_state(&self.state).form = None;
    }

    /// Create or update depending on the draft, then resync on success.
    pub async fn submit(&self) -> ActionOutcome {
        let (draft, generation) = {
            let mut state = lock_state(&self.state);
            let Some(form) = state.form.as_mut() else {
                return ActionOutcome::Skipped;
            };
            if form.busy {
                return ActionOutcome::Skipped;
            }
            if let Err(error) = form.draft.validate() {
                let message = error.user_message();
                form.error = Some(message.clone());
                return ActionOutcome::Rejected(message);
            }
            form.busy = true;
            form.error = None;
            (form.draft.clone(), form.generation)
        };
        let _busy = Claim::new(&self.state, move |state: &mut NotesState| {
            if let Some(form) = state
                .form
                .as_mut()
                .filter(|form| form.generation == generation)
            {
                form.busy = false;
            }
        });

        let request = match &draft.editing {
            Some(id) => self.api.update_note(id, &draft),
            None => self.api.create_note(&draft),
        };
        let Some(result) = self.lifecycle.run(request).await else {
            return ActionOutcome::Discarded;
        };

        match result {
            Ok(()) => {
                {
                    let mut state = lock_state(&self.state);
                    if state.form.as_ref().is_some_and(|form| form.generation == generation) {
                        state.form = None;
                    }
                }
                self.resync().await;
                ActionOutcome::Completed
            }
            Err(error) => {
                tracing::warn!("Failed to save note: {}", error);
                let message = error.user_message();
                let mut state = lock_state(&self.state);
                if let Some(form) = state
                    .form
                    .as_mut()
                    .filter(|form| form.generation == generation)
                {
                    form.busy = false;
                    form.error = Some(message.clone());
                }
                ActionOutcome::Failed(message)
            }
        }
    }

    /// Delete after confirmation. A note that is already gone counts as deleted.
    pub async fn delete(&self, id: &NoteId, confirmation: &impl Confirmation) -> ActionOutcome {
        if !confirmation.confirm(DELETE_PROMPT) {
            return ActionOutcome::Skipped;
        }
        {
            let mut state = lock_state(&self.state);
            if state.deleting.contains(id) {
                return ActionOutcome::Skipped;
            }
            state.deleting.push(id.clone());
        }
        let pending = id.clone();
        let deleting = Claim::new(&self.state, move |state: &mut NotesState| {
            state.deleting.retain(|other| other != &pending);
        });

        let result = self.lifecycle.run(self.api.delete_note(id)).await;
        drop(deleting);
        let Some(result) = result else {
            return ActionOutcome::Discarded;
        };

        match result {
            Ok(()) => {
                self.resync().await;
                ActionOutcome::Completed
            }
            Err(error) if error.is_not_found() => {
                tracing::debug!(note = %id, "Note already deleted");
                self.resync().await;
                ActionOutcome::Completed
            }
            Err(error) => {
                tracing::warn!("Failed to delete note: {}", error);
                let message = error.user_message();
                lock_state(&self.state).error = Some(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }

    pub fn view(&self) -> DashboardView {
        let state = lock_state(&self.state);
        let list = if state.load == LoadState::Loading {
            NoteListView::Loading
        } else {
            let visible = filter_notes(&state.notes, state.filter);
            if visible.is_empty() {
                NoteListView::Empty
            } else {
                NoteListView::Notes(visible)
            }
        };
        DashboardView {
            filter: state.filter,
            error: state.error.clone(),
            list,
            form: state.form.clone(),
        }
    }

    /// Abandon outstanding requests; their results will not be applied.
    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }
}

impl<R: RemoteApi> Drop for NotesViewModel<R> {
    fn drop(&mut self) {
        self.lifecycle.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::client::fake::{note, Call, FakeRemote};
    use crate::error::Error;
    use crate::models::NoteCategory;

    fn yes(_: &str) -> bool {
        true
    }

    async fn mounted(api: &Arc<FakeRemote>) -> NotesViewModel<FakeRemote> {
        let vm = NotesViewModel::new(Arc::clone(api));
        assert_eq!(vm.mount().await, ActionOutcome::Completed);
        vm
    }

    #[tokio::test]
    async fn mount_loads_once() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;

        assert_eq!(vm.mount().await, ActionOutcome::Skipped);
        assert_eq!(vm.load_state(), LoadState::Loaded);
        assert_eq!(api.count(Call::ListNotes), 1);
    }

    #[tokio::test]
    async fn filtering_is_pure_and_issues_no_call() {
        let api = Arc::new(FakeRemote::with_notes(vec![
            note("a", "A", Category::Work),
            note("b", "B", Category::Personal),
            note("c", "C", Category::Work),
        ]));
        let vm = mounted(&api).await;
        let calls_before = api.calls();

        vm.set_filter(CategoryFilter::Only(Category::Work));
        let first = vm.visible_notes();
        let second = vm.visible_notes();

        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(api.calls(), calls_before);
        assert_eq!(vm.notes().len(), 3);
    }

    #[tokio::test]
    async fn unrecognized_category_only_visible_under_all() {
        let mut odd = note("x", "X", Category::Other);
        odd.category = NoteCategory::Unrecognized("archive".to_string());
        let api = Arc::new(FakeRemote::with_notes(vec![odd]));
        let vm = mounted(&api).await;

        assert_eq!(vm.visible_notes().len(), 1);
        vm.set_filter(CategoryFilter::Only(Category::Other));
        assert_eq!(vm.view().list, NoteListView::Empty);
    }

    #[tokio::test]
    async fn create_then_list_shows_one_new_note() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;

        vm.open_add();
        vm.set_title("A");
        vm.set_content("B");
        vm.set_category(Category::Work);
        assert_eq!(vm.form().unwrap().heading(), "Add Note");

        assert_eq!(vm.submit().await, ActionOutcome::Completed);

        let notes = vm.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "A");
        assert_eq!(notes[0].content, "B");
        assert_eq!(notes[0].category.known(), Some(Category::Work));
        assert!(!notes[0].id.as_str().is_empty());
        assert_eq!(vm.form(), None);
        assert_eq!(api.calls(), vec![Call::ListNotes, Call::CreateNote, Call::ListNotes]);
    }

    #[tokio::test]
    async fn empty_title_is_rejected_without_call() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;
        vm.open_add();
        vm.set_content("body only");

        let outcome = vm.submit().await;

        assert_eq!(outcome, ActionOutcome::Rejected("Title is required".to_string()));
        let form = vm.form().unwrap();
        assert_eq!(form.error.as_deref(), Some("Title is required"));
        assert!(!form.busy);
        assert_eq!(api.count(Call::CreateNote), 0);
    }

    #[tokio::test]
    async fn edit_without_changes_issues_one_update_and_no_create() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;
        let before = vm.notes();

        assert!(vm.open_edit(&NoteId::new("a")));
        let form = vm.form().unwrap();
        assert_eq!(form.heading(), "Edit Note");
        assert_eq!(form.submit_label(), "Update Note");
        assert_eq!(vm.submit().await, ActionOutcome::Completed);

        assert_eq!(vm.notes(), before);
        assert_eq!(api.count(Call::UpdateNote), 1);
        assert_eq!(api.count(Call::CreateNote), 0);
    }

    #[tokio::test]
    async fn open_edit_unknown_id_leaves_form_closed() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;
        assert!(!vm.open_edit(&NoteId::new("nope")));
        assert_eq!(vm.form(), None);
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft_for_retry() {
        let api = Arc::new(FakeRemote::new());
        api.fail(Call::CreateNote, Error::server(500, "Unable to add your note."));
        let vm = mounted(&api).await;
        vm.open_add();
        vm.set_title("Keep me");

        let outcome = vm.submit().await;

        assert_eq!(outcome, ActionOutcome::Failed("Unable to add your note.".to_string()));
        let form = vm.form().unwrap();
        assert_eq!(form.draft.title, "Keep me");
        assert_eq!(form.error.as_deref(), Some("Unable to add your note."));
        assert!(!form.busy);

        api.succeed(Call::CreateNote);
        assert_eq!(vm.submit().await, ActionOutcome::Completed);
        assert_eq!(vm.notes().len(), 1);
    }

    #[tokio::test]
    async fn deleting_twice_matches_deleting_once() {
        let api = Arc::new(FakeRemote::with_notes(vec![
            note("a", "A", Category::Work),
            note("b", "B", Category::Other),
        ]));
        let vm = mounted(&api).await;
        let id = NoteId::new("a");

        assert_eq!(vm.delete(&id, &yes).await, ActionOutcome::Completed);
        let once = vm.notes();
        assert_eq!(vm.delete(&id, &yes).await, ActionOutcome::Completed);

        assert_eq!(vm.notes(), once);
        assert_eq!(once.len(), 1);
        assert_eq!(vm.error(), None);
    }

    #[tokio::test]
    async fn declined_delete_issues_no_call() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;
        let prompts = Mutex::new(Vec::new());
        let decline = |prompt: &str| {
            prompts.lock().unwrap().push(prompt.to_string());
            false
        };

        assert_eq!(vm.delete(&NoteId::new("a"), &decline).await, ActionOutcome::Skipped);

        assert_eq!(api.count(Call::DeleteNote), 0);
        assert_eq!(prompts.into_inner().unwrap(), vec![DELETE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn delete_failure_is_shown() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        api.fail(Call::DeleteNote, Error::server(403, "Forbidden"));
        let vm = mounted(&api).await;

        let outcome = vm.delete(&NoteId::new("a"), &yes).await;

        assert_eq!(outcome, ActionOutcome::Failed("Forbidden".to_string()));
        assert_eq!(vm.error().as_deref(), Some("Forbidden"));
        assert_eq!(vm.notes().len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_notes_visible() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;
        api.fail(Call::ListNotes, Error::server(500, "Failed to fetch notes."));

        let outcome = vm.refresh().await;

        assert_eq!(outcome, ActionOutcome::Failed("Failed to fetch notes.".to_string()));
        assert_eq!(vm.load_state(), LoadState::LoadError);
        let view = vm.view();
        assert_eq!(view.error.as_deref(), Some("Failed to fetch notes."));
        assert!(matches!(view.list, NoteListView::Notes(ref notes) if notes.len() == 1));

        api.succeed(Call::ListNotes);
        vm.refresh().await;
        assert_eq!(vm.error(), None);
    }

    #[tokio::test]
    async fn empty_collection_then_personal_note_under_work_filter() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;
        assert_eq!(vm.view().list.placeholder(), Some(EMPTY_NOTES_MESSAGE));

        vm.set_filter(CategoryFilter::Only(Category::Work));
        vm.open_add();
        vm.set_title("Groceries");
        assert_eq!(vm.submit().await, ActionOutcome::Completed);

        assert_eq!(vm.notes().len(), 1);
        assert_eq!(vm.view().list, NoteListView::Empty);

        vm.set_filter(CategoryFilter::Only(Category::Personal));
        assert_eq!(vm.visible_notes().len(), 1);
        vm.set_filter(CategoryFilter::All);
        assert_eq!(vm.visible_notes().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_submit_issues_one_call() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;
        api.set_latency(Duration::from_millis(20));
        vm.open_add();
        vm.set_title("Once");

        let (first, second) = tokio::join!(vm.submit(), vm.submit());

        assert_eq!(first, ActionOutcome::Completed);
        assert_eq!(second, ActionOutcome::Skipped);
        assert_eq!(api.count(Call::CreateNote), 1);
        assert_eq!(vm.notes().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_refreshes_coalesce_into_one_follow_up() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;
        api.set_latency(Duration::from_millis(20));

        let (first, second, third) = tokio::join!(vm.refresh(), vm.refresh(), vm.refresh());

        assert_eq!(first, ActionOutcome::Completed);
        assert_eq!(second, ActionOutcome::Skipped);
        assert_eq!(third, ActionOutcome::Skipped);
        assert_eq!(api.count(Call::ListNotes), 3);
    }

    #[tokio::test]
    async fn late_response_after_teardown_is_ignored() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;
        api.insert_note(note("b", "B", Category::Work));
        api.set_latency(Duration::from_millis(50));
        let before = vm.notes();

        let (outcome, ()) = tokio::join!(vm.refresh(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            vm.teardown();
        });

        assert_eq!(outcome, ActionOutcome::Discarded);
        assert_eq!(vm.notes(), before);
        assert_eq!(vm.error(), None);
    }

    #[tokio::test]
    async fn loading_placeholder_while_first_fetch_runs() {
        let api = Arc::new(FakeRemote::new());
        api.set_latency(Duration::from_millis(20));
        let vm = NotesViewModel::new(Arc::clone(&api));

        let (_, placeholder) = tokio::join!(vm.mount(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            vm.view().list.placeholder()
        });

        assert_eq!(placeholder, Some(LOADING_NOTES_MESSAGE));
    }

    #[tokio::test]
    async fn abandoned_refresh_does_not_block_resync_after_write() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;
        api.set_latency(Duration::from_millis(50));

        let abandoned = tokio::time::timeout(Duration::from_millis(5), vm.refresh()).await;
        assert!(abandoned.is_err());
        assert_eq!(vm.load_state(), LoadState::Loaded);

        api.set_latency(Duration::ZERO);
        let lists_before = api.count(Call::ListNotes);
        vm.open_add();
        vm.set_title("B");

        assert_eq!(vm.submit().await, ActionOutcome::Completed);
        assert_eq!(api.count(Call::ListNotes), lists_before + 1);
        assert_eq!(vm.notes().len(), 2);
    }

    #[tokio::test]
    async fn abandoned_submit_leaves_form_ready_for_retry() {
        let api = Arc::new(FakeRemote::new());
        let vm = mounted(&api).await;
        api.set_latency(Duration::from_millis(50));
        vm.open_add();
        vm.set_title("Retry me");

        let abandoned = tokio::time::timeout(Duration::from_millis(5), vm.submit()).await;
        assert!(abandoned.is_err());
        let form = vm.form().unwrap();
        assert!(!form.busy);
        assert_eq!(form.draft.title, "Retry me");

        api.set_latency(Duration::ZERO);
        assert_eq!(vm.submit().await, ActionOutcome::Completed);
        assert_eq!(api.count(Call::CreateNote), 2);
        assert_eq!(vm.notes().len(), 1);
        assert_eq!(vm.form(), None);
    }

    #[tokio::test]
    async fn abandoned_delete_can_be_repeated() {
        let api = Arc::new(FakeRemote::with_notes(vec![note("a", "A", Category::Work)]));
        let vm = mounted(&api).await;
        api.set_latency(Duration::from_millis(50));
        let id = NoteId::new("a");

        let abandoned = tokio::time::timeout(Duration::from_millis(5), vm.delete(&id, &yes)).await;
        assert!(abandoned.is_err());

        api.set_latency(Duration::ZERO);
        assert_eq!(vm.delete(&id, &yes).await, ActionOutcome::Completed);
        assert_eq!(api.count(Call::DeleteNote), 2);
        assert!(vm.notes().is_empty());
    }
}
