use crate::api::ApiOutcome;
use crate::model::{Profile, ProfileUpdate};
use crate::pages::PageContext;
use crate::view::ViewState;

pub struct ProfilePage {
    ctx: PageContext,
    pub profile: ViewState<Profile>,
    draft: Option<Profile>,
    pub saving: bool,
    pub error: Option<String>,
}

impl ProfilePage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            profile: ViewState::Loading,
            draft: None,
            saving: false,
            error: None,
        }
    }

    pub async fn load(&mut self) {
        self.profile = ViewState::Loading;
        let outcome = self.ctx.api.get_profile().await;
        self.apply_profile(outcome);
    }

    pub fn apply_profile(&mut self, outcome: ApiOutcome<Profile>) {
        if outcome.is_cancelled() {
            return;
        }
        // A profile always renders, even with every field unset.
        self.profile = ViewState::from_outcome(outcome, |_| false);
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Start editing a copy of the loaded profile.
    pub fn begin_edit(&mut self) -> bool {
        match self.profile.loaded() {
            Some(p) => {
                self.draft = Some(p.clone());
                self.error = None;
                true
            }
            None => false,
        }
    }

    pub fn draft(&self) -> Option<&Profile> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Profile> {
        self.draft.as_mut()
    }

    /// Drop the draft; the loaded profile is untouched.
    pub fn cancel(&mut self) {
        self.draft = None;
        self.error = None;
    }

    pub fn pending_update(&self) -> ProfileUpdate {
        match (self.profile.loaded(), &self.draft) {
            (Some(original), Some(draft)) => ProfileUpdate::diff(original, draft),
            _ => ProfileUpdate::default(),
        }
    }

    /// Send only the changed fields. An unchanged draft just closes the editor.
    pub async fn save(&mut self) -> ApiOutcome<Profile> {
        let update = self.pending_update();
        if update.is_empty() {
            self.draft = None;
            return match self.profile.loaded() {
                Some(p) => ApiOutcome::success(p.clone()),
                None => ApiOutcome::failure("Profile not loaded"),
            };
        }
        self.saving = true;
        let outcome = self.ctx.api.update_profile(&update).await;
        self.apply_saved(outcome.clone());
        outcome
    }

    pub fn apply_saved(&mut self, outcome: ApiOutcome<Profile>) {
        self.saving = false;
        if outcome.is_cancelled() {
            return;
        }
        match outcome {
            ApiOutcome::Success { data } => {
                self.profile = ViewState::Loaded(data);
                self.draft = None;
                self.error = None;
            }
            ApiOutcome::Failure { error } => self.error = Some(error),
            ApiOutcome::Cancelled => {}
        }
    }
}
