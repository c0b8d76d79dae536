//! Client routes and the session guard

use atlas_auth::Session;

/// A navigable view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    TestData,
    Countries,
    /// Detail view; holds the URL-encoded path segment
    Country(String),
    /// Signed-in users only
    Protected,
}

/// Path of a country's detail view
pub fn country_path(common_name: &str) -> String {
    format!(
        "/countries/{}",
        urlencoding::encode(&common_name.to_lowercase())
    )
}

impl Route {
    /// Detail route for a country's common name
    pub fn country(common_name: &str) -> Self {
        Route::Country(urlencoding::encode(&common_name.to_lowercase()).into_owned())
    }

    /// Match a path; the query string and a trailing slash are ignored
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let route = match trimmed {
            "" => Route::Home,
            "/login" => Route::Login,
            "/test" => Route::TestData,
            "/countries" => Route::Countries,
            "/protected" => Route::Protected,
            other => {
                let segment = other.strip_prefix("/countries/")?;
                if segment.is_empty() || segment.contains('/') {
                    return None;
                }
                Route::Country(segment.to_string())
            }
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::TestData => "/test".to_string(),
            Route::Countries => "/countries".to_string(),
            Route::Country(segment) => format!("/countries/{}", segment),
            Route::Protected => "/protected".to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::TestData => "Test",
            Route::Countries => "Countries",
            Route::Country(_) => "Country",
            Route::Protected => "Protected Data",
        }
    }

    /// Authorization is session presence only
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Protected)
    }

    /// The route actually shown: guarded routes fall back to login
    pub fn guard(self, session: Option<&Session>) -> Self {
        if self.requires_session() && session.map_or(true, Session::is_expired) {
            Route::Login
        } else {
            self
        }
    }
}

/// Entry of the navigation bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub path: String,
}

/// Label of the session button
pub fn auth_label(session: Option<&Session>) -> String {
    match session.filter(|s| !s.is_expired()) {
        Some(session) => format!("Logout ({})", session.email().unwrap_or_default()),
        None => "Login".to_string(),
    }
}

/// Navigation bar for the current session
pub fn navigation(session: Option<&Session>) -> Vec<NavItem> {
    let mut items: Vec<NavItem> = [
        Route::Home,
        Route::TestData,
        Route::Countries,
        Route::Protected,
    ]
    .iter()
    .map(|route| NavItem {
        label: route.label().to_string(),
        path: route.path(),
    })
    .collect();

    items.push(NavItem {
        label: auth_label(session),
        path: Route::Login.path(),
    });
    items
}
