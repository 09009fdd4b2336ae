//! Click-to-place marker creation
//!
//! ```text
//! Idle --map click--> PromptOpen --valid submit--> Submitting --response--> Idle
//!                      |  ^
//!                      |  +-- invalid submit (stays open, inline notice)
//!                      +--cancel / closed by map--> Idle
//! ```
//!
//! Only one prompt exists at a time: map clicks while a prompt is open or a
//! submission is in flight are ignored. Anonymous viewers never get a flow.

use shared::{CreateMarkerForm, LngLat};
use thiserror::Error;

use crate::surface::MarkerHandle;

/// Values typed into the placement prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptInput {
    pub name: String,
    /// Existing tag chosen from the list
    pub tag: String,
    /// Free-text tag; wins over `tag` when non-empty
    pub new_tag: String,
}

impl PromptInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_new_tag(mut self, new_tag: impl Into<String>) -> Self {
        self.new_tag = new_tag.into();
        self
    }
}

/// Rejected submission
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreationError {
    #[error("Please enter a name for the marker")]
    EmptyName,

    #[error("No placement prompt is open")]
    NoPrompt,

    #[error("{0} is not a valid position")]
    InvalidCoordinate(LngLat),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreationState {
    Idle,
    PromptOpen {
        at: LngLat,
    },
    Submitting {
        form: CreateMarkerForm,
        optimistic: Option<MarkerHandle>,
    },
}

#[derive(Debug)]
pub struct MarkerCreationFlow {
    user_id: u64,
    state: CreationState,
}

impl MarkerCreationFlow {
    /// `None` for anonymous viewers, who cannot place markers
    pub fn for_viewer(user_id: u64) -> Option<Self> {
        (user_id > 0).then_some(Self {
            user_id,
            state: CreationState::Idle,
        })
    }

    /// Map clicked at `at`. Returns whether a prompt should open.
    pub fn on_map_click(&mut self, at: LngLat) -> bool {
        match self.state {
            CreationState::Idle => {
                tracing::debug!(%at, "Placement prompt opened");
                self.state = CreationState::PromptOpen { at };
                true
            }
            _ => {
                tracing::debug!(%at, "Map click ignored, placement already in progress");
                false
            }
        }
    }

    /// Cancel button: discard input without any request
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, CreationState::PromptOpen { .. }) {
            self.state = CreationState::Idle;
            return true;
        }
        false
    }

    /// Validate the prompt and move to `Submitting`
    pub fn submit(&mut self, input: &PromptInput) -> Result<CreateMarkerForm, CreationError> {
        let CreationState::PromptOpen { at } = self.state else {
            return Err(CreationError::NoPrompt);
        };
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CreationError::EmptyName);
        }
        if !at.is_finite() {
            return Err(CreationError::InvalidCoordinate(at));
        }

        let form = CreateMarkerForm {
            user_id: self.user_id,
            name: name.to_string(),
            tag: input.tag.trim().to_string(),
            new_tag: input.new_tag.trim().to_string(),
            lat: at.lat,
            lng: at.lng,
        };
        self.state = CreationState::Submitting {
            form: form.clone(),
            optimistic: None,
        };
        Ok(form)
    }

    /// Remember the optimistically placed marker of the pending submission
    pub fn attach_optimistic(&mut self, handle: MarkerHandle) {
        if let CreationState::Submitting { optimistic, .. } = &mut self.state {
            *optimistic = Some(handle);
        }
    }

    /// Submission answered; back to idle. Returns the submitted form and
    /// its optimistic marker.
    pub fn finish(&mut self) -> Option<(CreateMarkerForm, Option<MarkerHandle>)> {
        match std::mem::replace(&mut self.state, CreationState::Idle) {
            CreationState::Submitting { form, optimistic } => Some((form, optimistic)),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn state(&self) -> &CreationState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CreationState::Idle
    }

    pub fn is_prompt_open(&self) -> bool {
        matches!(self.state, CreationState::PromptOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_viewer_has_no_flow() {
        assert!(MarkerCreationFlow::for_viewer(0).is_none());
        assert!(MarkerCreationFlow::for_viewer(5).is_some());
    }

    #[test]
    fn test_second_click_is_ignored() {
        let mut flow = MarkerCreationFlow::for_viewer(5).unwrap();
        assert!(flow.on_map_click(LngLat::new(13.4, 52.5)));
        assert!(!flow.on_map_click(LngLat::new(0.0, 0.0)));
        assert_eq!(
            flow.state(),
            &CreationState::PromptOpen {
                at: LngLat::new(13.4, 52.5)
            }
        );
    }

    #[test]
    fn test_submit_builds_form() {
        let mut flow = MarkerCreationFlow::for_viewer(5).unwrap();
        flow.on_map_click(LngLat::new(13.4, 52.5));
        let form = flow
            .submit(&PromptInput::new(" Cafe X ").with_new_tag("Food"))
            .unwrap();

        assert_eq!(form.user_id, 5);
        assert_eq!(form.name, "Cafe X");
        assert_eq!(form.new_tag, "Food");
        assert_eq!(form.lat, 52.5);
        assert_eq!(form.lng, 13.4);

        // Still blocked while submitting
        assert!(!flow.on_map_click(LngLat::new(1.0, 1.0)));
        assert!(!flow.cancel());
    }

    #[test]
    fn test_empty_name_keeps_prompt_open() {
        let mut flow = MarkerCreationFlow::for_viewer(5).unwrap();
        flow.on_map_click(LngLat::new(13.4, 52.5));
        assert_eq!(
            flow.submit(&PromptInput::new("  ").with_tag("Shop")),
            Err(CreationError::EmptyName)
        );
        assert!(flow.is_prompt_open());
    }

    #[test]
    fn test_submit_without_prompt() {
        let mut flow = MarkerCreationFlow::for_viewer(5).unwrap();
        assert_eq!(
            flow.submit(&PromptInput::new("Cafe")),
            Err(CreationError::NoPrompt)
        );
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut flow = MarkerCreationFlow::for_viewer(5).unwrap();
        flow.on_map_click(LngLat::new(13.4, 52.5));
        assert!(flow.cancel());
        assert!(flow.is_idle());
        assert!(flow.finish().is_none());
    }

    #[test]
    fn test_finish_hands_back_optimistic_marker() {
        let mut flow = MarkerCreationFlow::for_viewer(5).unwrap();
        flow.on_map_click(LngLat::new(13.4, 52.5));
        flow.submit(&PromptInput::new("Cafe X").with_tag("Shop")).unwrap();
        flow.attach_optimistic(MarkerHandle(9));

        let (form, optimistic) = flow.finish().unwrap();
        assert_eq!(form.tag, "Shop");
        assert_eq!(optimistic, Some(MarkerHandle(9)));
        assert!(flow.is_idle());
    }
}
