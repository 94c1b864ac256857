/// The four mutually exclusive views. The active one is carried by the
/// request path, so nothing is remembered between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    AddSubject,
    AddSession,
    ViewSubjects,
    ViewSessions,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::AddSubject,
        Mode::AddSession,
        Mode::ViewSubjects,
        Mode::ViewSessions,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::AddSubject => "Add Subject",
            Mode::AddSession => "Add Session",
            Mode::ViewSubjects => "View Subjects",
            Mode::ViewSessions => "View Sessions",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Mode::AddSubject => "/subjects/new",
            Mode::AddSession => "/sessions/new",
            Mode::ViewSubjects => "/subjects",
            Mode::ViewSessions => "/sessions",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Mode::AddSubject => "Add New Subject",
            Mode::AddSession => "Log New Session",
            Mode::ViewSubjects => "Subjects Table",
            Mode::ViewSessions => "Sessions Table",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::AddSubject => {
                "Please enter the details for the rat subject participating in the experiment."
            }
            Mode::AddSession => {
                "Select a subject and enter the session details for the experiment."
            }
            Mode::ViewSubjects => {
                "Below is a list of all rat subjects registered for the Visual Perception Experiment."
            }
            Mode::ViewSessions => {
                "Below is a record of all experimental sessions logged for the Visual Perception Experiment."
            }
        }
    }
}
