use super::SessionMode;

/// A path-shaped location inside the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Welcome,
    SetAdminPassword,
    Login,
    Agents,
    NewAgent,
    Agent(String),
    UpdateAdminPassword,
    Chat(String),
    Logout,
    Unknown(String),
}

impl Route {
    /// Parses a path such as `/agent/support-bot`. Trailing slashes, query
    /// strings and fragments are ignored.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let without_query = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = without_query
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        match segments.as_slice() {
            [] => Route::Root,
            ["welcome"] => Route::Welcome,
            ["set-admin-password"] => Route::SetAdminPassword,
            ["login"] => Route::Login,
            ["agents"] => Route::Agents,
            ["agent"] => Route::NewAgent,
            ["agent", name] => Route::Agent((*name).to_string()),
            ["update-admin-password"] => Route::UpdateAdminPassword,
            ["chat", name] => Route::Chat((*name).to_string()),
            ["logout"] => Route::Logout,
            _ => Route::Unknown(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Root => String::from("/"),
            Route::Welcome => String::from("/welcome"),
            Route::SetAdminPassword => String::from("/set-admin-password"),
            Route::Login => String::from("/login"),
            Route::Agents => String::from("/agents"),
            Route::NewAgent => String::from("/agent"),
            Route::Agent(name) => format!("/agent/{name}"),
            Route::UpdateAdminPassword => String::from("/update-admin-password"),
            Route::Chat(name) => format!("/chat/{name}"),
            Route::Logout => String::from("/logout"),
            Route::Unknown(path) => path.clone(),
        }
    }
}

/// The screen a route renders once access is granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    SetAdminPassword,
    Login,
    AgentList,
    /// `None` edits a record that has not been created yet.
    AgentEditor(Option<String>),
    UpdateAdminPassword,
    Chat(String),
    Logout,
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Startup checks are still running; show the loading screen only.
    Loading,
    Render(View),
    Redirect(Route),
}

/// Decides what a route shows in the given session mode.
pub fn resolve_route(mode: SessionMode, route: &Route) -> RouteDecision {
    match mode {
        SessionMode::Loading => RouteDecision::Loading,
        SessionMode::NoAdminPassword => match route {
            Route::Welcome | Route::SetAdminPassword => {
                RouteDecision::Render(View::SetAdminPassword)
            }
            _ => RouteDecision::Redirect(Route::Welcome),
        },
        SessionMode::Unauthenticated => match route {
            Route::Login => RouteDecision::Render(View::Login),
            Route::Chat(name) => RouteDecision::Render(View::Chat(name.clone())),
            _ => RouteDecision::Redirect(Route::Login),
        },
        SessionMode::Authenticated => match route {
            Route::Root => RouteDecision::Redirect(Route::Agents),
            Route::Agents => RouteDecision::Render(View::AgentList),
            Route::NewAgent => RouteDecision::Render(View::AgentEditor(None)),
            Route::Agent(name) => RouteDecision::Render(View::AgentEditor(Some(name.clone()))),
            Route::UpdateAdminPassword => RouteDecision::Render(View::UpdateAdminPassword),
            Route::Chat(name) => RouteDecision::Render(View::Chat(name.clone())),
            Route::Logout => RouteDecision::Render(View::Logout),
            other => RouteDecision::Render(View::NotFound(other.path())),
        },
    }
}

/// Follows redirects until a view renders. Returns `None` while loading.
pub fn settle(mode: SessionMode, route: Route) -> Option<(Route, View)> {
    let mut current = route;
    // Every redirect target renders directly in its own mode, two hops is enough.
    for _ in 0..3 {
        match resolve_route(mode, &current) {
            RouteDecision::Loading => return None,
            RouteDecision::Render(view) => return Some((current, view)),
            RouteDecision::Redirect(next) => current = next,
        }
    }
    Some((current.clone(), View::NotFound(current.path())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(Route::parse(""), Route::Root);
        assert_eq!(Route::parse("/agents/"), Route::Agents);
        assert_eq!(Route::parse("/agent"), Route::NewAgent);
        assert_eq!(
            Route::parse("/agent/support-bot"),
            Route::Agent(String::from("support-bot"))
        );
        assert_eq!(
            Route::parse("/chat/foo?x=1"),
            Route::Chat(String::from("foo"))
        );
        assert_eq!(
            Route::parse("/agent/a/b"),
            Route::Unknown(String::from("/agent/a/b"))
        );
    }

    #[test]
    fn path_round_trips_through_parse() {
        for route in [
            Route::Welcome,
            Route::Agents,
            Route::Agent(String::from("x")),
            Route::Chat(String::from("y")),
            Route::Logout,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn loading_renders_nothing() {
        assert_eq!(
            resolve_route(SessionMode::Loading, &Route::Agents),
            RouteDecision::Loading
        );
        assert_eq!(settle(SessionMode::Loading, Route::Login), None);
    }

    #[test]
    fn setup_mode_sends_everything_to_welcome() {
        let mode = SessionMode::NoAdminPassword;
        assert_eq!(
            resolve_route(mode, &Route::Agents),
            RouteDecision::Redirect(Route::Welcome)
        );
        assert_eq!(
            resolve_route(mode, &Route::SetAdminPassword),
            RouteDecision::Render(View::SetAdminPassword)
        );
        assert_eq!(
            settle(mode, Route::Chat(String::from("foo"))),
            Some((Route::Welcome, View::SetAdminPassword))
        );
    }

    #[test]
    fn signed_out_allows_login_and_chat() {
        let mode = SessionMode::Unauthenticated;
        assert_eq!(
            resolve_route(mode, &Route::Agents),
            RouteDecision::Redirect(Route::Login)
        );
        assert_eq!(
            resolve_route(mode, &Route::Root),
            RouteDecision::Redirect(Route::Login)
        );
        assert_eq!(
            resolve_route(mode, &Route::Chat(String::from("foo"))),
            RouteDecision::Render(View::Chat(String::from("foo")))
        );
    }

    #[test]
    fn signed_in_renders_not_found_without_redirect() {
        let mode = SessionMode::Authenticated;
        assert_eq!(
            resolve_route(mode, &Route::Root),
            RouteDecision::Redirect(Route::Agents)
        );
        assert_eq!(
            resolve_route(mode, &Route::Login),
            RouteDecision::Render(View::NotFound(String::from("/login")))
        );
        assert_eq!(
            resolve_route(mode, &Route::Welcome),
            RouteDecision::Render(View::NotFound(String::from("/welcome")))
        );
        assert_eq!(
            resolve_route(mode, &Route::NewAgent),
            RouteDecision::Render(View::AgentEditor(None))
        );
        assert_eq!(
            settle(mode, Route::Root),
            Some((Route::Agents, View::AgentList))
        );
    }
}
