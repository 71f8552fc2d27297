use crate::todo::TodoId;

/// Screens the shell can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Create,
    Edit(TodoId),
    Stats,
}

impl Route {
    pub fn path(self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Create => "/new".to_string(),
            Route::Edit(id) => format!("/edit/{}", id),
            Route::Stats => "/stats".to_string(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::List => "Home",
            Route::Create => "New",
            Route::Edit(_) => "Edit",
            Route::Stats => "Stats",
        }
    }

    // Entries of the bottom navigation bar.
    pub const NAV_BAR: [Route; 3] = [Route::List, Route::Create, Route::Stats];
}
