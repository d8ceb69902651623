/**
 * View Gate
 * Decides whether a requester sees full premium content and whether a
 * view should be credited to the recipe's writer
 */
use uuid::Uuid;

/// Role of the requesting user, as carried in the JWT (or absent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRole {
    Anonymous,
    Subscriber,
    RecipeWriter,
    Admin,
}

/// Everything the gate needs to know about the requester.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub id: Option<Uuid>,
    pub role: ViewerRole,
    pub has_active_subscription: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Viewer {
            id: None,
            role: ViewerRole::Anonymous,
            has_active_subscription: false,
        }
    }
}

/// Outcome of evaluating a (viewer, recipe) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    /// Steps, ingredients and quantities may be returned to this viewer.
    pub full_content: bool,
    /// This request should trigger the compensation transaction.
    pub compensable: bool,
}

/// Full content is visible when the recipe is free, or the viewer is an
/// admin, or the viewer holds a currently Active subscription.
pub fn full_content_visible(viewer: &Viewer, is_premium: bool) -> bool {
    !is_premium || viewer.role == ViewerRole::Admin || viewer.has_active_subscription
}

/// A view is compensable only when every condition holds:
/// premium recipe, authenticated non-admin viewer, first view by this
/// viewer, and the viewer is not the recipe's own writer.
pub fn is_compensable(
    viewer: &Viewer,
    recipe_writer_id: Uuid,
    is_premium: bool,
    already_viewed: bool,
) -> bool {
    if !is_premium {
        return false;
    }
    let Some(viewer_id) = viewer.id else {
        return false;
    };
    if viewer.role == ViewerRole::Admin {
        return false;
    }
    if already_viewed {
        return false;
    }
    viewer_id != recipe_writer_id
}

pub fn evaluate(
    viewer: &Viewer,
    recipe_writer_id: Uuid,
    is_premium: bool,
    already_viewed: bool,
) -> GateDecision {
    GateDecision {
        full_content: full_content_visible(viewer, is_premium),
        compensable: is_compensable(viewer, recipe_writer_id, is_premium, already_viewed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber(id: Uuid, active: bool) -> Viewer {
        Viewer {
            id: Some(id),
            role: ViewerRole::Subscriber,
            has_active_subscription: active,
        }
    }

    fn admin(id: Uuid) -> Viewer {
        Viewer {
            id: Some(id),
            role: ViewerRole::Admin,
            has_active_subscription: false,
        }
    }

    #[test]
    fn test_free_recipe_visible_to_everyone() {
        assert!(full_content_visible(&Viewer::anonymous(), false));
        assert!(full_content_visible(&subscriber(Uuid::new_v4(), false), false));
        assert!(full_content_visible(&admin(Uuid::new_v4()), false));
    }

    #[test]
    fn test_premium_recipe_hidden_without_subscription() {
        assert!(!full_content_visible(&Viewer::anonymous(), true));
        assert!(!full_content_visible(&subscriber(Uuid::new_v4(), false), true));
    }

    #[test]
    fn test_premium_recipe_visible_with_subscription_or_admin() {
        assert!(full_content_visible(&subscriber(Uuid::new_v4(), true), true));
        assert!(full_content_visible(&admin(Uuid::new_v4()), true));
    }

    #[test]
    fn test_free_recipe_view_never_compensable() {
        let writer = Uuid::new_v4();
        let viewer = subscriber(Uuid::new_v4(), true);
        assert!(!is_compensable(&viewer, writer, false, false));
    }

    #[test]
    fn test_anonymous_view_never_compensable() {
        let writer = Uuid::new_v4();
        assert!(!is_compensable(&Viewer::anonymous(), writer, true, false));
    }

    #[test]
    fn test_admin_view_never_compensable() {
        let writer = Uuid::new_v4();
        assert!(!is_compensable(&admin(Uuid::new_v4()), writer, true, false));
    }

    #[test]
    fn test_repeat_view_not_compensable() {
        let writer = Uuid::new_v4();
        let viewer = subscriber(Uuid::new_v4(), true);
        assert!(is_compensable(&viewer, writer, true, false));
        assert!(!is_compensable(&viewer, writer, true, true));
    }

    #[test]
    fn test_self_view_not_compensable() {
        let writer = Uuid::new_v4();
        let viewer = Viewer {
            id: Some(writer),
            role: ViewerRole::RecipeWriter,
            has_active_subscription: false,
        };
        assert!(!is_compensable(&viewer, writer, true, false));
    }

    #[test]
    fn test_qualifying_first_view_is_compensable() {
        let writer = Uuid::new_v4();
        let viewer = subscriber(Uuid::new_v4(), false);
        let decision = evaluate(&viewer, writer, true, false);
        // Compensation does not require content visibility: a first view by
        // an authenticated non-owner still credits the writer.
        assert!(!decision.full_content);
        assert!(decision.compensable);
    }
}
