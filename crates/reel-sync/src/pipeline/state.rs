use std::fmt;

use reel_core::{dispatch_reaction, dispatch_relationship, Action, Reaction, Transition};

/// Local state a subject handle can hold
///
/// `dispatch` returns `None` when the action does not apply to this kind of
/// state (a follow sent to a video).
pub trait SubjectState: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn dispatch(&self, action: Action) -> Option<Transition<Self>>;
}

impl SubjectState for Reaction {
    fn dispatch(&self, action: Action) -> Option<Transition<Self>> {
        action
            .as_reaction()
            .map(|action| dispatch_reaction(*self, action))
    }
}

/// Follow or subscription: `true` while active
impl SubjectState for bool {
    fn dispatch(&self, action: Action) -> Option<Transition<Self>> {
        action
            .as_relationship()
            .map(|action| dispatch_relationship(*self, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_rejects_relationship_actions() {
        assert!(Reaction::None.dispatch(Action::Follow).is_none());
        assert_eq!(Reaction::None.dispatch(Action::Like).unwrap().next, Reaction::Like);
    }

    #[test]
    fn test_relationship_rejects_reactions() {
        assert!(false.dispatch(Action::Dislike).is_none());
        assert!(false.dispatch(Action::ToggleFollow).unwrap().next);
    }
}
