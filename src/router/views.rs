//! View descriptors the router loads on first navigation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Login,
    Register,
    CandidateApplications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub id: ViewId,
    pub title: &'static str,
    pub summary: &'static str,
}

#[must_use]
pub fn login() -> View {
    View { id: ViewId::Login, title: "Sign in", summary: "Sign in with email and password." }
}

#[must_use]
pub fn register() -> View {
    View {
        id: ViewId::Register,
        title: "Create account",
        summary: "Register as a recruiter or a candidate.",
    }
}

#[must_use]
pub fn candidate_applications() -> View {
    View {
        id: ViewId::CandidateApplications,
        title: "My applications",
        summary: "Applications and CV analyses for the signed-in candidate.",
    }
}
