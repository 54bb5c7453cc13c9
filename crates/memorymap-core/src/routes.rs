//! URL path to page mapping, with a catch-all for unknown paths.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    NewEntry,
    EditEntry(String),
    Coaching,
    Gallery,
    Profile,
    Feedback,
    NewFeedback,
    Dream,
    Map,
    Notifications,
    EmotionalMap,
    Memories,
    Quotes,
    ApiTest,
    NotFound(String),
}

impl Route {
    /// Every route without a path parameter.
    pub const FIXED: [Route; 17] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::NewEntry,
        Route::Coaching,
        Route::Gallery,
        Route::Profile,
        Route::Feedback,
        Route::NewFeedback,
        Route::Dream,
        Route::Map,
        Route::Notifications,
        Route::EmotionalMap,
        Route::Memories,
        Route::Quotes,
        Route::ApiTest,
    ];

    pub fn parse(path: &str) -> Self {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["diary", "new"] => Self::NewEntry,
            ["diary", id] => Self::EditEntry((*id).to_string()),
            ["coaching"] => Self::Coaching,
            ["gallery"] => Self::Gallery,
            ["profile"] => Self::Profile,
            ["feedback"] => Self::Feedback,
            ["feedback", "new"] => Self::NewFeedback,
            ["dream"] => Self::Dream,
            ["map"] => Self::Map,
            ["notifications"] => Self::Notifications,
            ["emotional-map"] => Self::EmotionalMap,
            ["memories"] => Self::Memories,
            ["quotes"] => Self::Quotes,
            ["test"] => Self::ApiTest,
            _ => Self::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::NewEntry => "/diary/new".into(),
            Self::EditEntry(id) => format!("/diary/{id}"),
            Self::Coaching => "/coaching".into(),
            Self::Gallery => "/gallery".into(),
            Self::Profile => "/profile".into(),
            Self::Feedback => "/feedback".into(),
            Self::NewFeedback => "/feedback/new".into(),
            Self::Dream => "/dream".into(),
            Self::Map => "/map".into(),
            Self::Notifications => "/notifications".into(),
            Self::EmotionalMap => "/emotional-map".into(),
            Self::Memories => "/memories".into(),
            Self::Quotes => "/quotes".into(),
            Self::ApiTest => "/test".into(),
            Self::NotFound(p) => p.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::Dashboard => "Dashboard",
            Self::NewEntry => "New entry",
            Self::EditEntry(_) => "Edit entry",
            Self::Coaching => "AI Coach",
            Self::Gallery => "Gallery",
            Self::Profile => "Profile",
            Self::Feedback => "Feedback",
            Self::NewFeedback => "Send feedback",
            Self::Dream => "Dream visualization",
            Self::Map => "Map",
            Self::Notifications => "Notifications",
            Self::EmotionalMap => "Emotional Map",
            Self::Memories => "Memories",
            Self::Quotes => "Quotes",
            Self::ApiTest => "API test",
            Self::NotFound(_) => "Page not found",
        }
    }

    /// Whether the page needs a stored token to be useful.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::Home | Self::Login | Self::Register | Self::ApiTest | Self::NotFound(_)
        )
    }

    /// Header navigation, in display order.
    pub fn nav() -> [Route; 6] {
        [
            Route::Dashboard,
            Route::Coaching,
            Route::EmotionalMap,
            Route::Memories,
            Route::Quotes,
            Route::Profile,
        ]
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
